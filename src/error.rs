//! Error types for the REST API.

use crate::endpoint::EndpointError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;


/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Endpoint layer failure.
    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status and machine-readable code for this error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Endpoint(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ENDPOINT_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

/// Receives transport and internal errors for logging.
pub trait ErrorSink: Send + Sync {
    /// Reports `err` raised while serving the request `request_id`.
    fn report(&self, request_id: Option<&str>, err: &ApiError);
}

/// Error sink writing to `tracing`.
///
/// Server errors are logged at error level, client errors at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, request_id: Option<&str>, err: &ApiError) {
        let (status, code) = err.status_and_code();
        let request_id = request_id.unwrap_or("-");
        if status.is_server_error() {
            error!(request_id, code, error = %err, "HTTP error");
        } else {
            warn!(request_id, code, error = %err, "HTTP error");
        }
    }
}
