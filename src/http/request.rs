//! Request identification.
//!
//! Every request gets an `x-request-id`: the client's, if it sent a usable
//! one, otherwise a fresh UUID v4. The ID is stored as a request extension
//! and echoed on the response.

use std::fmt;

use axum::http::{HeaderName, HeaderValue, Request};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const MAX_CLIENT_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the request ID attached by the error-handling middleware.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Reuse the client's ID or assign a new one, recording it on the request.
pub fn ensure_request_id<B>(request: &mut Request<B>) -> RequestId {
    let existing = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_CLIENT_ID_LEN)
        .map(|v| RequestId(v.to_string()));

    let id = match existing {
        Some(id) => id,
        None => {
            let id = RequestId::generate();
            if let Some(value) = id.header_value() {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
            id
        }
    };

    request.extensions_mut().insert(id.clone());
    id
}
