//! OpenAI-compatible chat-completions backend.
//!
//! # Data Flow
//! ```text
//! (from, to, text)
//!     → PromptTemplate::render (display names, prefix, text)
//!     → POST {base_url}/chat/completions   (per-attempt timeout)
//!     → classify: transport / 5xx / 429 → retry with backoff
//!                 other 4xx / bad body   → fail immediately
//!     → choices[0].message.content
//!     → text::clean_translation
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::schema::BackendConfig;
use crate::resilience::retries::{is_retryable_status, RetryPolicy};
use crate::translation::backend::{BackendError, Translator};
use crate::translation::languages::display_name;
use crate::translation::text::clean_translation;

pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "{{PROMPT_PREFIX}} FROM {{LANGUAGE_BASE}} to {{LANGUAGE_TO}} :: {{TEXT}}";

/// Placeholder-based prompt builder.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    prefix: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            prefix: prefix.into(),
        }
    }

    /// Fill in the placeholders. Language codes are replaced with their
    /// English names when known.
    ///
    /// A template without `{{TEXT}}` gets the text appended after its
    /// first ` :: ` separator instead.
    pub fn render(&self, from: &str, to: &str, text: &str) -> String {
        let prompt = self
            .template
            .replace("{{PROMPT_PREFIX}}", &self.prefix)
            .replace("{{LANGUAGE_BASE}}", display_name(from).unwrap_or(from))
            .replace("{{LANGUAGE_TO}}", display_name(to).unwrap_or(to));

        if prompt.contains("{{TEXT}}") {
            return prompt.replace("{{TEXT}}", text);
        }
        match prompt.find(" :: ") {
            Some(idx) => format!("{} :: {}", &prompt[..idx], text),
            None => prompt,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a completion body.
pub fn parse_completion(body: &str) -> Result<String, BackendError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::fatal(format!("invalid completion JSON: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| BackendError::fatal("no translation in completion response"))
}

/// Chat-completions client with bounded retries.
pub struct OpenAiTranslator {
    http: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    prompt: PromptTemplate,
    retry: RetryPolicy,
}

impl OpenAiTranslator {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| BackendError::fatal(format!("invalid API key format: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::fatal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            prompt: PromptTemplate::new(config.prompt_template.clone(), config.prompt_prefix.clone()),
            retry: RetryPolicy::new(
                config.max_attempts,
                config.base_delay_ms,
                config.max_delay_ms,
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn attempt(&self, prompt: &str) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::retryable(format!("backend request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::retryable(format!("failed to read backend response: {}", e)))?;

        if !(200..300).contains(&status) {
            let message = if status >= 500 { "backend server error" } else { "backend rejected request" };
            let error = if is_retryable_status(status) {
                BackendError::retryable(format!("{} ({})", message, status))
            } else {
                BackendError::fatal(format!("{} ({})", message, status))
            };
            return Err(error.with_status(status));
        }

        let raw = parse_completion(&body).map_err(|e| e.with_status(status))?;
        let cleaned = clean_translation(&raw);
        if cleaned.is_empty() {
            return Err(BackendError::empty_output().with_status(status));
        }
        Ok(cleaned)
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, from: &str, to: &str, text: &str) -> Result<String, BackendError> {
        let prompt = self.prompt.render(from, to, text);
        let mut attempt = 1;

        loop {
            match self.attempt(&prompt).await {
                Ok(translated) => {
                    tracing::debug!(attempt, max_attempts = self.retry.max_attempts, "Translation attempt succeeded");
                    return Ok(translated);
                }
                Err(error) if error.retryable => match self.retry.delay_before(attempt + 1) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            max_attempts = self.retry.max_attempts,
                            status = ?error.status,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "Backend attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(error),
                },
                Err(error) => return Err(error),
            }
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}
