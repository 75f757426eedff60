//! Pipeline assembly and serving.
//!
//! # Responsibilities
//! - Wrap route dispatch in the middleware stack, outermost first:
//!   error handling → request tracing → CORS → routes
//! - Give unmatched requests a structured 404
//! - Serve on an already-bound listener until shutdown
//!
//! # Design Decisions
//! - Error handling is outermost so nothing downstream escapes unformatted
//! - The tracing layer does not log failures; the error middleware owns that

use axum::http::{Method, Uri};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::http::cors::cors_layer;
use crate::http::error::AppError;
use crate::http::middleware::handle_errors;
use crate::http::state::AppState;

/// Install the middleware stack around `routes`.
pub fn assemble(state: AppState, routes: Router<AppState>) -> Router {
    let cors = cors_layer(&state.settings.cors);

    routes
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(handle_errors))
                .layer(TraceLayer::new_for_http().on_failure(()))
                .layer(cors),
        )
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("{} is not allowed on {}", method, uri.path()))
}

/// HTTP server for the assembled pipeline.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
