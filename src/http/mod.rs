//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve loop)
//!     → middleware/error_handling.rs (request ID, panic capture, error translation)
//!     → cors.rs (policy enforcement, preflight)
//!     → tower-http trace span
//!     → route dispatch (handlers return Result<_, AppError>)
//!     → error.rs (structured error body) on failure
//! ```

pub mod cors;
pub mod error;
pub mod middleware;
pub mod request;
pub mod server;
pub mod state;

pub use error::{AppError, ErrorBody, ErrorReport};
pub use request::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{assemble, HttpServer};
pub use state::AppState;
