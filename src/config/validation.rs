//! Settings validation.
//!
//! Serde handles syntactic checks; this module covers value ranges and
//! parseability. Returns every problem found, not just the first.

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::{HeaderName, HeaderValue, Method};
use tracing::level_filters::LevelFilter;

use crate::config::schema::{CorsConfig, Settings};

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate loaded settings.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", settings.server.bind_address),
        ));
    }

    let model_api = &settings.app_settings.model_api;
    if model_api.host.trim().is_empty() {
        errors.push(ValidationError::new("app_settings.model_api.host", "must not be empty"));
    }
    if model_api.port == 0 {
        errors.push(ValidationError::new("app_settings.model_api.port", "must be non-zero"));
    }
    if model_api.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "app_settings.model_api.timeout_secs",
            "must be non-zero",
        ));
    }

    if settings.connection_strings.default_connection.trim().is_empty() {
        errors.push(ValidationError::new(
            "connection_strings.default_connection",
            "must not be empty",
        ));
    }

    if settings.database.max_connections == 0 {
        errors.push(ValidationError::new("database.max_connections", "must be non-zero"));
    }
    if settings.database.acquire_timeout_secs == 0 {
        errors.push(ValidationError::new("database.acquire_timeout_secs", "must be non-zero"));
    }

    for (field, level) in [
        ("logging.file_level", &settings.logging.file_level),
        ("logging.console_level", &settings.logging.console_level),
    ] {
        if LevelFilter::from_str(level).is_err() {
            errors.push(ValidationError::new(field, format!("unknown level '{}'", level)));
        }
    }

    validate_cors(&settings.cors, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_cors(cors: &CorsConfig, errors: &mut Vec<ValidationError>) {
    for origin in cors.allowed_origins.iter().filter(|o| o.as_str() != "*") {
        if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new(
                "cors.allowed_origins",
                format!("invalid origin '{}'", origin),
            ));
        }
    }
    for method in cors.allowed_methods.iter().filter(|m| m.as_str() != "*") {
        if Method::from_str(method).is_err() {
            errors.push(ValidationError::new(
                "cors.allowed_methods",
                format!("invalid method '{}'", method),
            ));
        }
    }
    for header in cors.allowed_headers.iter().filter(|h| h.as_str() != "*") {
        if HeaderName::from_str(header).is_err() {
            errors.push(ValidationError::new(
                "cors.allowed_headers",
                format!("invalid header '{}'", header),
            ));
        }
    }
}
