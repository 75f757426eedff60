//! Startup orchestration.
//!
//! # Stages
//! ```text
//! Compose → Probe → Migrate → Assemble → Serve
//! ```
//!
//! - Compose: build shared components (fatal on failure)
//! - Probe: one GET to the model API health endpoint (never fatal)
//! - Migrate: apply pending schema migrations (fatal on failure)
//! - Assemble: wrap routes in the middleware stack
//! - Serve: bind and accept; nothing is accepted before Assemble completes
//!
//! # Design Decisions
//! - Stages run sequentially, once, before any request handling
//! - An unreachable peer may recover after boot; an unmigrated schema will not
//! - `Application` only exists after a successful migration, so serving
//!   without one is unrepresentable

use std::fmt;
use std::io;

use axum::http::StatusCode;
use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::clients::ClientError;
use crate::health::{probe_dependency, ProbeOutcome};
use crate::http::{assemble, AppState, HttpServer};
use crate::persistence::{MigrationReport, PersistenceError};

/// Startup state machine stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StartupStage {
    Compose,
    Probe,
    Migrate,
    Assemble,
    Serve,
}

impl fmt::Display for StartupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupStage::Compose => "compose",
            StartupStage::Probe => "probe",
            StartupStage::Migrate => "migrate",
            StartupStage::Assemble => "assemble",
            StartupStage::Serve => "serve",
        };
        f.write_str(name)
    }
}

pub(crate) fn enter(stage: StartupStage) {
    tracing::info!(stage = %stage, "Entering startup stage");
}

/// Boot-time fatal errors.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to compose outbound clients: {0}")]
    Client(#[from] ClientError),

    #[error("failed to compose persistence: {0}")]
    Database(#[source] PersistenceError),

    #[error("schema migration failed: {0}")]
    Migration(#[source] PersistenceError),

    #[error("failed to bind {address}: {source}")]
    Bind { address: String, source: io::Error },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

impl StartupError {
    /// The stage this error aborted.
    pub fn stage(&self) -> StartupStage {
        match self {
            StartupError::Client(_) | StartupError::Database(_) => StartupStage::Compose,
            StartupError::Migration(_) => StartupStage::Migrate,
            StartupError::Bind { .. } | StartupError::Serve(_) => StartupStage::Serve,
        }
    }
}

/// What the readiness sequence observed.
#[derive(Debug, Clone, Serialize)]
pub struct StartupReport {
    pub probe: ProbeOutcome,
    pub migration: MigrationReport,
}

/// Runs Probe → Migrate → Assemble over composed state.
pub struct Startup {
    state: AppState,
}

impl Startup {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Run the readiness sequence and assemble the pipeline around `routes`.
    pub async fn prepare(self, routes: Router<AppState>) -> Result<Application, StartupError> {
        enter(StartupStage::Probe);
        self.announce_settings();
        let probe = self.probe().await;

        enter(StartupStage::Migrate);
        let migration = self.migrate().await?;

        enter(StartupStage::Assemble);
        let router = assemble(self.state, routes);

        Ok(Application {
            router,
            report: StartupReport { probe, migration },
        })
    }

    /// Print the resolved application settings for operators.
    fn announce_settings(&self) {
        match serde_json::to_string(&self.state.settings.app_settings) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!(error = %e, "Failed to render settings"),
        }
    }

    /// Probe the model API once. The outcome never changes what happens next.
    pub async fn probe(&self) -> ProbeOutcome {
        let path = &self.state.settings.app_settings.model_api.health_path;
        let outcome = probe_dependency(&self.state.model_api, path).await;

        for line in console_lines(&outcome) {
            println!("{}", line);
        }
        match &outcome {
            ProbeOutcome::Healthy { status, .. } => {
                tracing::info!(status, url = %self.state.model_api.base_url(), "Model API is healthy");
            }
            ProbeOutcome::Unhealthy { status, .. } => {
                tracing::warn!(
                    status,
                    url = %self.state.model_api.base_url(),
                    "Model API reported unhealthy, continuing startup"
                );
            }
            ProbeOutcome::Unreachable { message } => {
                tracing::warn!(
                    error = %message,
                    url = %self.state.model_api.base_url(),
                    "Model API unreachable, continuing startup"
                );
            }
        }

        outcome
    }

    /// Apply pending migrations. Failure aborts startup.
    pub async fn migrate(&self) -> Result<MigrationReport, StartupError> {
        self.state.db.migrate().await.map_err(|e| {
            tracing::error!(error = %e, "Schema migration failed, aborting startup");
            StartupError::Migration(e)
        })
    }
}

/// What the operator sees on stdout for a probe: the body or failure
/// message, then the status line when the service answered with an error.
fn console_lines(outcome: &ProbeOutcome) -> Vec<String> {
    let mut lines = vec![outcome.detail().to_string()];
    if let ProbeOutcome::Unhealthy { status, .. } = outcome {
        let reason = StatusCode::from_u16(*status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
        lines.push(format!(
            "Response status code does not indicate success: {} ({}).",
            status, reason
        ));
    }
    lines
}

/// The assembled pipeline, ready to serve.
pub struct Application {
    router: Router,
    report: StartupReport,
}

impl Application {
    pub fn report(&self) -> &StartupReport {
        &self.report
    }

    /// A handle to the assembled router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Accept connections on `listener` until `shutdown` fires.
    pub async fn serve(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        enter(StartupStage::Serve);
        HttpServer::new(self.router)
            .run(listener, shutdown)
            .await
            .map_err(StartupError::Serve)
    }
}
