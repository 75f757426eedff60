//! Error-handling middleware.
//!
//! Outermost layer of the pipeline. Converts every failure raised downstream
//! (an `AppError` returned by a handler, or a panic) into the structured
//! error body, and records exactly one log event for it.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;

use crate::http::error::{AppError, ErrorReport};
use crate::http::request::{ensure_request_id, RequestId, X_REQUEST_ID};

pub async fn handle_errors(mut request: Request, next: Next) -> Response {
    let request_id = ensure_request_id(&mut request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => AppError::Internal(format!("handler panicked: {}", panic_message(&*panic))).into_response(),
    };

    if let Some(report) = response.extensions_mut().remove::<ErrorReport>() {
        record_failure(&report, &request_id, &method, &path);
        response = render(response, &report, &request_id);
    }

    if let Some(value) = request_id.header_value() {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    response
}

/// Swap the body for one that carries the request ID, keeping status and
/// headers set further down the chain.
fn render(response: Response, report: &ErrorReport, request_id: &RequestId) -> Response {
    let (mut parts, _) = response.into_parts();

    let body = match serde_json::to_vec(&report.body(Some(request_id))) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to encode error body");
            Vec::new()
        }
    };

    parts.status = report.status;
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Response::from_parts(parts, Body::from(body))
}

fn record_failure(report: &ErrorReport, request_id: &RequestId, method: &Method, path: &str) {
    if report.status.is_server_error() {
        tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = report.status.as_u16(),
            code = report.code,
            error = %report.detail,
            "Request failed"
        );
    } else {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = report.status.as_u16(),
            code = report.code,
            error = %report.detail,
            "Request rejected"
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{middleware, Router};
    use tower::ServiceExt;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    use crate::http::error::ErrorBody;

    /// Counts events at WARN or above.
    struct FailureCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for FailureCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() <= Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    fn app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route(
                "/fails",
                get(|| async { Err::<&'static str, _>(AppError::Internal("disk on fire".into())) }),
            )
            .route(
                "/missing",
                get(|| async { Err::<&'static str, _>(AppError::NotFound("tool kit 7 not found".into())) }),
            )
            .route("/panics", get(explode))
            .layer(middleware::from_fn(handle_errors))
    }

    async fn call(path: &str) -> Response {
        app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn error_body(response: Response) -> ErrorBody {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_handler_error_becomes_structured_body_with_one_log() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(FailureCounter(count.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = call("/fails").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let request_id = response.headers().get("x-request-id").unwrap().to_str().unwrap().to_string();

        let body = error_body(response).await;
        assert_eq!(body.error.code, "internal_error");
        assert_eq!(body.error.status, 500);
        assert!(!body.error.message.contains("disk on fire"));
        assert_eq!(body.error.request_id.as_deref(), Some(request_id.as_str()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panic_is_caught_and_logged_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(FailureCounter(count.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = call("/panics").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = error_body(response).await;
        assert_eq!(body.error.code, "internal_error");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_client_error_keeps_message() {
        let response = call("/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = error_body(response).await;
        assert_eq!(body.error.message, "tool kit 7 not found");
    }

    #[tokio::test]
    async fn test_success_passes_through_untouched() {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(FailureCounter(count.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = call("/ok").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"fine");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*boxed), "owned");

        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*boxed), "static");

        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*boxed), "unknown panic payload");
    }
}
