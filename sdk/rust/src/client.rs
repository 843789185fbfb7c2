use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Body of `POST /translate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub timestamp: String,
    pub uuid: String,
    pub from: String,
    pub to: String,
    pub text: String,
}

impl TranslateRequest {
    /// A request with a fresh v4 uuid and the current UTC time.
    pub fn new(from: &str, to: &str, text: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            uuid: uuid::Uuid::new_v4().to_string(),
            from: from.to_string(),
            to: to.to_string(),
            text: text.to_string(),
        }
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

/// Status and decoded body of a gateway reply. Error replies are returned
/// here too; inspect `status` and `body["error_code"]`.
#[derive(Debug, Clone)]
pub struct TranslateResult {
    pub status: StatusCode,
    pub retry_after: Option<u64>,
    pub body: Value,
}

impl TranslateResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn translated_text(&self) -> Option<&str> {
        self.body.get("translated_text").and_then(Value::as_str)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error_code").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub backend: String,
}

pub struct TranslationClient {
    client: Client,
    base_url: String,
}

impl TranslationClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn health(&self) -> Result<(StatusCode, HealthStatus), ClientError> {
        let resp = self.client.get(format!("{}/health", self.base_url)).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        Ok((status, serde_json::from_slice(&bytes)?))
    }

    pub async fn translate(&self, req: &TranslateRequest) -> Result<TranslateResult, ClientError> {
        self.post_raw(serde_json::to_string(req)?).await
    }

    /// Send an arbitrary body to `/translate`; useful for probing error paths.
    pub async fn post_raw(&self, body: impl Into<reqwest::Body>) -> Result<TranslateResult, ClientError> {
        let resp = self
            .client
            .post(format!("{}/translate", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let bytes = resp.bytes().await?;
        Ok(TranslateResult {
            status,
            retry_after,
            body: serde_json::from_slice(&bytes)?,
        })
    }
}
