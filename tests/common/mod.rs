//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use transbasket::cache::TranslationCache;
use transbasket::{Gateway, GatewayConfig, Shutdown};
use transbasket_client::TranslationClient;

/// How the mock completion backend answers.
#[derive(Clone, Debug)]
pub enum Behavior {
    /// `[<to-language>] <text>` for every prompt.
    Echo,
    /// Fail the first `n` calls with `status`, then echo.
    FailFirst(usize, u16),
    /// Always answer with `status`.
    Status(u16),
    /// Sleep, then echo.
    Slow(Duration),
    /// A completion whose content cleans to nothing.
    Empty,
}

#[derive(Clone)]
struct MockState {
    behavior: Behavior,
    hits: Arc<AtomicUsize>,
}

/// A running OpenAI-compatible stub.
pub struct MockBackend {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_mock_backend(behavior: Behavior) -> MockBackend {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = MockState {
        behavior,
        hits: hits.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend {
        base_url: format!("http://{}/v1", addr),
        hits,
    }
}

async fn completions(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    let call = state.hits.fetch_add(1, Ordering::SeqCst);
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();

    match state.behavior {
        Behavior::Echo => completion(echo(&prompt)),
        Behavior::FailFirst(n, status) if call < n => failure(status),
        Behavior::FailFirst(..) => completion(echo(&prompt)),
        Behavior::Status(status) => failure(status),
        Behavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            completion(echo(&prompt))
        }
        Behavior::Empty => completion(" \u{1F600} ".to_string()),
    }
}

/// `"... FROM Korean to English :: 안녕"` → `"[English] 안녕"`.
fn echo(prompt: &str) -> String {
    let (head, text) = prompt.split_once(" :: ").unwrap_or(("", prompt));
    let to = head.rsplit(" to ").next().unwrap_or("?");
    format!("[{}] {}", to, text)
}

fn completion(content: String) -> Response {
    Json(json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]}))
        .into_response()
}

fn failure(status: u16) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    (status, Json(json!({"error": {"message": "injected"}}))).into_response()
}

/// A gateway serving on an ephemeral port.
pub struct TestGateway {
    pub base_url: String,
    pub client: TranslationClient,
    pub shutdown: Shutdown,
    pub cache: Option<TranslationCache>,
    pub server: JoinHandle<()>,
    _dir: tempfile::TempDir,
}

/// Test-friendly defaults: fast retries, cache disabled, temp cache path.
pub fn test_config(backend_url: &str, dir: &std::path::Path) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.backend.base_url = backend_url.to_string();
    config.backend.api_key = "sk-test".to_string();
    config.backend.base_delay_ms = 10;
    config.backend.max_delay_ms = 50;
    config.backend.timeout_secs = 5;
    config.backend.deadline_secs = 10;
    config.cache.enabled = false;
    config.cache.autosave_secs = 0;
    config.cache.path = dir.join("cache.jsonl").display().to_string();
    config
}

pub async fn spawn_gateway(backend_url: &str, tweak: impl FnOnce(&mut GatewayConfig)) -> TestGateway {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(backend_url, dir.path());
    tweak(&mut config);

    let gateway = Gateway::from_config(config).unwrap();
    let shutdown = gateway.shutdown().clone();
    let cache = gateway.cache().cloned();
    let listener = gateway.bind().await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let server = tokio::spawn(async move {
        gateway.serve(listener).await.unwrap();
    });

    TestGateway {
        client: TranslationClient::new(&base_url),
        base_url,
        shutdown,
        cache,
        server,
        _dir: dir,
    }
}
