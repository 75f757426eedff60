//! Health subsystem.
//!
//! # Data Flow
//! ```text
//! Startup readiness probe (probe.rs):
//!     named model-api client
//!     → GET {base}/{health_path}, once
//!     → ProbeOutcome (Healthy | Unhealthy | Unreachable)
//!     → logged, never fatal
//!
//! Own endpoints (handlers.rs):
//!     GET /health        → liveness
//!     GET /health/ready  → database session + model API probe
//! ```
//!
//! # Design Decisions
//! - Probe failures are values, not errors
//! - No retry or backoff; the dependency may come up after we start serving

pub mod handlers;
pub mod probe;

pub use probe::{probe_dependency, ProbeOutcome};
