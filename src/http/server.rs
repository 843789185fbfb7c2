//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, CORS)
//! - Bind server to listener and drain on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::health::Readiness;
use crate::http::handlers;
use crate::http::request::{make_request_span, UuidRequestId};
use crate::lifecycle::ShutdownSignal;
use crate::translation::dispatcher::Dispatcher;
use crate::translation::validator::Validator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<Validator>,
    pub dispatcher: Arc<Dispatcher>,
    pub readiness: Readiness,
}

impl AppState {
    pub fn new(validator: Validator, dispatcher: Dispatcher, readiness: Readiness) -> Self {
        Self {
            validator: Arc::new(validator),
            dispatcher: Arc::new(dispatcher),
            readiness,
        }
    }
}

/// HTTP server for the translation gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::health))
            .route("/translate", post(handlers::translate))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        let router = if config.security.cors_allow_any {
            router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            router
        };

        router
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// A clone of the fully layered router, for in-process serving.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_in_flight = self.config.listener.max_in_flight,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.triggered().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::backend::{BackendError, Translator};
    use crate::translation::types::{ErrorResponse, TranslationResponse};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Upper;

    #[async_trait]
    impl Translator for Upper {
        async fn translate(&self, _from: &str, _to: &str, text: &str) -> Result<String, BackendError> {
            Ok(text.to_uppercase())
        }
    }

    struct Down;

    #[async_trait]
    impl Translator for Down {
        async fn translate(&self, _from: &str, _to: &str, _text: &str) -> Result<String, BackendError> {
            Err(BackendError::retryable("connection refused"))
        }
    }

    fn router_with(backend: Arc<dyn Translator>, ready: bool) -> Router {
        let config = GatewayConfig::default();
        let state = AppState::new(
            Validator::default(),
            Dispatcher::new(backend, Duration::from_secs(5)),
            Readiness::new(ready),
        );
        HttpServer::new(config, state).router()
    }

    fn post_translate(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/translate")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn valid() -> Value {
        json!({
            "timestamp": "2025-10-10T01:23:45.678Z",
            "uuid": "550e8400-e29b-41d4-a716-446655440000",
            "from": "ENG",
            "to": "kor",
            "text": "hello",
        })
    }

    #[tokio::test]
    async fn test_translate_echoes_correlation_fields() {
        let response = router_with(Arc::new(Upper), true)
            .oneshot(post_translate(valid().to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body: TranslationResponse = json_body(response).await;
        assert_eq!(body.uuid, "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(body.timestamp, "2025-10-10T01:23:45.678Z");
        assert_eq!(body.from, "eng");
        assert_eq!(body.translated_text, "HELLO");
        assert!(!body.cached);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        for raw in ["{not json", "", "{\"uuid\": }"] {
            let response = router_with(Arc::new(Upper), true)
                .oneshot(post_translate(raw))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{:?}", raw);
            let body: ErrorResponse = json_body(response).await;
            assert_eq!(body.error_code, "PARSE_ERROR");
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_400() {
        let response = router_with(Arc::new(Upper), true)
            .oneshot(post_translate(vec![0xff, 0xfe, 0x7b]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_semantic_error_is_422() {
        let mut body = valid();
        body["text"] = json!("   ");
        let response = router_with(Arc::new(Upper), true)
            .oneshot(post_translate(body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let error: ErrorResponse = json_body(response).await;
        assert_eq!(error.error_code, "EMPTY_TEXT");
        assert_eq!(error.uuid.as_deref(), Some("550e8400-e29b-41d4-a716-446655440000"));
    }

    #[tokio::test]
    async fn test_backend_down_is_503() {
        let response = router_with(Arc::new(Down), true)
            .oneshot(post_translate(valid().to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()["retry-after"], "5");
    }

    #[tokio::test]
    async fn test_health_reflects_readiness() {
        let response = router_with(Arc::new(Upper), true)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: handlers::HealthResponse = json_body(response).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.service, "transbasket");

        let response = router_with(Arc::new(Upper), false)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_route_and_wrong_method() {
        let response = router_with(Arc::new(Upper), true)
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.error_code, "NOT_FOUND");

        let response = router_with(Arc::new(Upper), true)
            .oneshot(Request::get("/translate").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let mut config = GatewayConfig::default();
        config.security.max_body_size = 64;
        let state = AppState::new(
            Validator::default(),
            Dispatcher::new(Arc::new(Upper), Duration::from_secs(5)),
            Readiness::new(true),
        );
        let router = HttpServer::new(config, state).router();

        let mut body = valid();
        body["text"] = json!("x".repeat(500));
        let response = router.oneshot(post_translate(body.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
