//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config/toolkeeper.toml + TOOLKEEPER__* environment
//!     → loader.rs (layer sources, check required sections, deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Settings are loaded once; there is no reload
//! - Missing required sections abort startup instead of defaulting
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_settings, ConfigError, SettingsLoader};
pub use schema::{
    AppSettings, ConnectionStrings, CorsConfig, DatabaseConfig, LoggingConfig, ModelApiSettings,
    ServerConfig, Settings,
};
