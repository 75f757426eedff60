//! CORS policy.
//!
//! Built from `[cors]`. A `"*"` entry in a list means "any"; the shipped
//! default is `*` for origins, methods and headers.

use std::str::FromStr;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;

fn allows_any(entries: &[String]) -> bool {
    entries.iter().any(|e| e == "*")
}

/// Build the CORS layer. Entries were checked during settings validation.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if allows_any(&config.allowed_origins) {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    let methods = if allows_any(&config.allowed_methods) {
        AllowMethods::from(Any)
    } else {
        AllowMethods::list(
            config
                .allowed_methods
                .iter()
                .filter_map(|m| Method::from_str(m).ok()),
        )
    };

    let headers = if allows_any(&config.allowed_headers) {
        AllowHeaders::from(Any)
    } else {
        AllowHeaders::list(
            config
                .allowed_headers
                .iter()
                .filter_map(|h| HeaderName::from_str(h).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}
