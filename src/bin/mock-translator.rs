//! OpenAI-compatible stub backend for local runs.
//!
//! Answers `POST /v1/chat/completions` with a deterministic "translation"
//! of the text after the prompt's ` :: ` separator.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use serde_json::{json, Value};
use tokio::sync::Mutex;

#[derive(Parser, Clone)]
#[command(name = "mock-translator", about = "OpenAI-compatible stub translation backend")]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1:8090")]
    bind: SocketAddr,

    /// Artificial latency per request.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Answer every request with this HTTP status instead of a completion.
    #[arg(long)]
    fail_status: Option<u16>,
}

#[derive(Clone)]
struct MockState {
    args: Args,
    /// Captured request bodies (spy pattern).
    history: Arc<Mutex<Vec<Value>>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let bind = args.bind;

    let state = MockState {
        args,
        history: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(mock_chat))
        .route("/chat/completions", post(mock_chat))
        .route("/_admin/history", get(admin_history))
        .route("/health", get(|| async { "OK" }))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await.map_err(|e| {
        tracing::error!(address = %bind, error = %e, "Failed to bind");
        e
    })?;
    tracing::info!(address = %bind, "Mock translator listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn mock_chat(State(state): State<MockState>, Json(payload): Json<Value>) -> Response {
    state.history.lock().await.push(payload.clone());

    if state.args.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(state.args.delay_ms)).await;
    }
    if let Some(status) = state.args.fail_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"error": {"message": "injected failure"}}))).into_response();
    }

    let prompt = payload["messages"][0]["content"].as_str().unwrap_or_default();
    let text = prompt.split_once(" :: ").map(|(_, t)| t).unwrap_or(prompt);
    tracing::info!(chars = text.chars().count(), "Completion requested");

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": format!("[translated] {}", text)},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

async fn admin_history(State(state): State<MockState>) -> Json<Vec<Value>> {
    Json(state.history.lock().await.clone())
}
