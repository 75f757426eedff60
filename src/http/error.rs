//! Application errors and their wire shape.
//!
//! Handlers return `Result<_, AppError>`. The error renders a structured JSON
//! body and tags the response with an [`ErrorReport`] extension; the
//! error-handling middleware picks that up, stamps the request ID and writes
//! the single log line for the failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::request::RequestId;
use crate::persistence::PersistenceError;
use crate::services::ServiceError;

const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// Failures a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Persistence(PersistenceError::Acquire(_))
            | AppError::Persistence(PersistenceError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::MethodNotAllowed(_) => "method_not_allowed",
            AppError::Unavailable(_) => "service_unavailable",
            AppError::Persistence(_) => "database_error",
            AppError::Upstream(_) => "upstream_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn report(&self) -> ErrorReport {
        let status = self.status();
        let detail = self.to_string();
        // Internal details go to the log only.
        let message = match self {
            AppError::NotFound(_)
            | AppError::BadRequest(_)
            | AppError::MethodNotAllowed(_)
            | AppError::Unavailable(_) => detail.clone(),
            _ => INTERNAL_MESSAGE.to_string(),
        };

        ErrorReport {
            status,
            code: self.code(),
            message,
            detail,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report().into_response()
    }
}

/// A failure on its way out of the pipeline.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub code: &'static str,
    /// Client-facing message.
    pub message: String,
    /// Full failure description, for the log.
    pub detail: String,
}

impl ErrorReport {
    pub fn body(&self, request_id: Option<&RequestId>) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                status: self.status.as_u16(),
                code: self.code.to_string(),
                message: self.message.clone(),
                request_id: request_id.map(|id| id.to_string()),
            },
        }
    }
}

impl IntoResponse for ErrorReport {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body(None))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Structured error body returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub status: u16,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_keep_their_message() {
        let report = AppError::NotFound("no such route: /nope".into()).report();
        assert_eq!(report.status, StatusCode::NOT_FOUND);
        assert_eq!(report.code, "not_found");
        assert_eq!(report.message, "no such route: /nope");
    }

    #[test]
    fn test_method_not_allowed_keeps_message() {
        let report = AppError::MethodNotAllowed("POST is not allowed on /health".into()).report();
        assert_eq!(report.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(report.code, "method_not_allowed");
        assert_eq!(report.message, "POST is not allowed on /health");
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let report = AppError::Internal("connection pool poisoned at 0x1234".into()).report();
        assert_eq!(report.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(report.message, INTERNAL_MESSAGE);
        assert!(report.detail.contains("0x1234"));
    }

    #[test]
    fn test_unavailable_database_maps_to_503() {
        let err = AppError::from(ServiceError::Persistence(PersistenceError::Unavailable("down".into())));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.code(), "database_error");
    }

    #[test]
    fn test_response_carries_report_extension() {
        let response = AppError::BadRequest("missing name".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.code, "bad_request");
    }
}
