//! Configuration schema definitions.
//!
//! This module defines the complete settings tree for the backend.
//! All types derive Serde traits for deserialization from config sources.
//! `app_settings` and `connection_strings` have no defaults: they must be
//! present in one of the sources or startup aborts.

use serde::{Deserialize, Serialize};

/// Root settings for the backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Listener configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Application settings, including the outbound model API.
    pub app_settings: AppSettings,

    /// Named database connection strings.
    pub connection_strings: ConnectionStrings,

    /// Connection pool and migration settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// CORS policy.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Log sinks and thresholds.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Application-level settings printed at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppSettings {
    /// The dependent model service.
    pub model_api: ModelApiSettings,
}

/// Location of the dependent model service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelApiSettings {
    /// Host, with or without scheme (e.g., "http://model" or "model").
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Health endpoint, relative to the base address.
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
}

fn default_health_path() -> String {
    "health".to_string()
}

fn default_client_timeout() -> u64 {
    10
}

/// Database connection strings.
#[derive(Clone, Deserialize, Serialize)]
pub struct ConnectionStrings {
    /// Connection string used by the context factory.
    pub default_connection: String,
}

// Connection strings carry credentials.
impl std::fmt::Debug for ConnectionStrings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStrings")
            .field("default_connection", &"<redacted>")
            .finish()
    }
}

/// Pool and migration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Maximum pooled connections.
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    pub acquire_timeout_secs: u64,

    /// Directory holding `<version>_<description>.sql` migrations.
    pub migrations_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
            migrations_dir: "migrations".to_string(),
        }
    }
}

/// CORS policy. `"*"` in any list means "any".
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["*".to_string()],
            allowed_headers: vec!["*".to_string()],
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for rolling log files.
    pub directory: String,

    /// File name prefix (files are named `<prefix>.<date>.log`).
    pub file_prefix: String,

    /// Minimum level written to the file sink.
    pub file_level: String,

    /// Minimum level written to the console sink.
    pub console_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "Logs".to_string(),
            file_prefix: "toolkeeper".to_string(),
            file_level: "warn".to_string(),
            console_level: "info".to_string(),
        }
    }
}
