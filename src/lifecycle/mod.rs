//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (compose.rs, startup.rs):
//!     Settings → Compose → Probe → Migrate → Assemble → bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then components, then the listener
//! - The listener binds only after the pipeline is assembled

pub mod compose;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use compose::{compose, compose_with_database};
pub use shutdown::Shutdown;
pub use startup::{Application, Startup, StartupError, StartupReport, StartupStage};

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::Settings;
use crate::routes;

/// Run the whole startup sequence and serve until `shutdown` fires.
pub async fn run(settings: Settings, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
    startup::enter(StartupStage::Compose);
    let state = compose(settings)?;
    let bind_address = state.settings.server.bind_address.clone();

    let application = Startup::new(state).prepare(routes::router()).await?;

    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    application.serve(listener, shutdown).await
}
