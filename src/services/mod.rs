//! Domain service capabilities and their bindings.
//!
//! # Data Flow
//! ```text
//! composition
//!     → registry.rs (one transient binding per capability)
//!     → handler calls registry.tool_kits() → fresh instance
//!     → instance acquires its own Session, releases it on drop
//! ```
//!
//! # Design Decisions
//! - Capabilities are traits; handlers never name concrete types
//! - Every capability is a required registry field, so a missing binding
//!   cannot compile
//! - Transient lifetime: no state survives between resolutions

pub mod employees;
pub mod registry;
pub mod tool_kits;
pub mod tools;

pub use employees::{EmployeeService, PgEmployeeService};
pub use registry::{ServiceRegistry, Transient};
pub use tool_kits::{PgToolKitService, ToolKitService};
pub use tools::{PgToolService, ToolService};

use crate::persistence::{ContextFactory, PersistenceError};

/// Error type for domain service calls.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Run a `SELECT COUNT(*)` style query on a fresh session.
pub(crate) async fn count_rows(db: &dyn ContextFactory, sql: &'static str) -> Result<i64, ServiceError> {
    let mut session = db.session().await?;
    let count: i64 = sqlx::query_scalar(sql)
        .fetch_one(session.connection())
        .await
        .map_err(PersistenceError::from)?;
    Ok(count)
}
