//! Error-to-response mapping.
//!
//! # Responsibilities
//! - Map each failure layer to its status code
//! - Render the shared JSON error body, echoing correlation fields
//!
//! # Status Codes
//! ```text
//! Parse        → 400  body is not JSON
//! Validation   → 422  JSON, but a field rule failed
//! Backend      → 503  retryable (Retry-After: 5)
//!              → 502  non-retryable
//! PayloadTooLarge → 413
//! NotFound     → 404
//! ```

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::translation::backend::BackendError;
use crate::translation::types::{ErrorResponse, ViolationBody};
use crate::translation::validator::ValidationFailure;

/// Seconds a client should wait before retrying a 503.
pub const RETRY_AFTER_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed request body: {0}")]
    Parse(String),

    #[error("request body exceeds the size limit")]
    PayloadTooLarge,

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("translation failed: {error}")]
    Backend {
        error: BackendError,
        uuid: String,
        timestamp: String,
    },

    #[error("no route for {0}")]
    NotFound(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Parse(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Backend { error, .. } if error.retryable => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Backend { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Parse(_) => "PARSE_ERROR",
            GatewayError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            GatewayError::Validation(failure) => failure.kind().code(),
            GatewayError::Backend { error, .. } if error.retryable => "BACKEND_UNAVAILABLE",
            GatewayError::Backend { .. } => "BACKEND_ERROR",
            GatewayError::NotFound(_) => "NOT_FOUND",
        }
    }

    fn body(self) -> ErrorResponse {
        let code = self.error_code();
        match self {
            GatewayError::Validation(failure) => {
                let primary = failure.primary();
                let mut body = ErrorResponse::new(code, primary.message.clone());
                body.field = Some(primary.field.to_string());
                body.violations = failure.violations.iter().map(ViolationBody::from).collect();
                body.with_correlation(failure.uuid, failure.timestamp)
            }
            GatewayError::Backend {
                error,
                uuid,
                timestamp,
            } => ErrorResponse::new(code, error.message).with_correlation(Some(uuid), Some(timestamp)),
            other => ErrorResponse::new(code, other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self.body())).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS));
        }
        response
    }
}
