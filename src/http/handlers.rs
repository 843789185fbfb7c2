//! Endpoint handlers.
//!
//! # Request Lifecycle (`POST /translate`)
//! ```text
//! ReceivedBytes → Parsed → Validated → Dispatched → Responded
//!       │            │          │
//!       │            │          └─ ValidationFailed → 422
//!       │            └─ ParseFailed → 400
//!       └─ over size limit → 413
//! ```
//!
//! Handlers are stateless across requests: every value they touch is
//! request-local or lives behind an `Arc` in [`AppState`].

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::request::RequestIdExt;
use crate::http::response::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::translation::types::TranslationResponse;

pub const SERVICE_NAME: &str = "transbasket";

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub backend: String,
}

pub async fn health(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let ready = state.readiness.is_ready();
    let (status, label, backend) = if ready {
        (StatusCode::OK, "ok", "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable", "unavailable")
    };

    let body = HealthResponse {
        status: label.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: backend.to_string(),
    };
    metrics::record_request("health", status.as_u16(), start);
    (status, Json(body)).into_response()
}

pub async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();
    let response = match handle_translate(&state, &headers, body).await {
        Ok(translated) => (StatusCode::OK, Json(translated)).into_response(),
        Err(error) => {
            tracing::info!(
                request_id = %headers.request_id(),
                status = error.status_code().as_u16(),
                error = %error,
                "Translate request failed"
            );
            error.into_response()
        }
    };
    metrics::record_request("translate", response.status().as_u16(), start);
    response
}

async fn handle_translate(
    state: &AppState,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<TranslationResponse, GatewayError> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge
        } else {
            GatewayError::Parse(rejection.body_text())
        }
    })?;

    let decoded: Value =
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Parse(e.to_string()))?;

    let request = state.validator.validate(&decoded).map_err(|failure| {
        metrics::record_validation_failure(failure.kind().code());
        GatewayError::Validation(failure)
    })?;

    tracing::debug!(
        request_id = %headers.request_id(),
        uuid = %request.uuid,
        "Request validated"
    );

    match state.dispatcher.dispatch(&request).await {
        Ok(translation) => Ok(TranslationResponse::new(request, translation.text, translation.cached)),
        Err(error) => Err(GatewayError::Backend {
            error,
            uuid: request.uuid,
            timestamp: request.timestamp,
        }),
    }
}

pub async fn not_found(uri: Uri) -> Response {
    GatewayError::NotFound(uri.path().to_string()).into_response()
}
