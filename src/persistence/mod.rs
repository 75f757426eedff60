//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! connection_strings.default_connection
//!     → factory.rs (lazy PgPool, built once at composition)
//!     → session.rs (one pooled connection per unit of work)
//!     → migrations.rs (apply pending schema changes before serving)
//! ```
//!
//! # Design Decisions
//! - The factory is shared; sessions are never shared
//! - Sessions return their connection to the pool on drop, on every exit path
//! - `ContextFactory` is a trait so tests can run without PostgreSQL

pub mod factory;
pub mod migrations;
pub mod session;

pub use factory::{ContextFactory, PgContextFactory};
pub use migrations::MigrationReport;
pub use session::Session;

/// Error type for persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("invalid database configuration: {0}")]
    Configuration(#[source] sqlx::Error),

    #[error("failed to acquire database session: {0}")]
    Acquire(#[source] sqlx::Error),

    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("database unavailable: {0}")]
    Unavailable(String),
}
