//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems emit tracing events
//!     → logging.rs (single process-wide subscriber)
//!         → rolling file sink (warn and above)
//!         → console sink (info and above)
//! ```
//!
//! # Design Decisions
//! - No component opens its own log destination
//! - Installed after settings load, before the startup sequence
//! - Request ID flows into every error log line

pub mod logging;

pub use logging::{init_logging, LogGuard, LoggingError};
