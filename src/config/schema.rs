//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All sections derive Serde traits and carry defaults, so a
//! minimal file (or none at all) is a valid starting point.

use serde::{Deserialize, Serialize};

use crate::translation::openai::DEFAULT_PROMPT_TEMPLATE;
use crate::translation::validator::DEFAULT_MAX_TEXT_CHARS;

/// Root configuration for the translation gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, backpressure).
    pub listener: ListenerConfig,

    /// Translation backend (OpenAI-compatible API).
    pub backend: BackendConfig,

    /// Request validation limits.
    pub validation: ValidationConfig,

    /// Additional accepted language codes.
    pub languages: LanguagesConfig,

    /// Translation cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body size limits and CORS.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8889").
    pub bind_address: String,

    /// Maximum backend translations in flight. Further requests queue for
    /// a slot within their `backend.deadline_secs` budget; this does not
    /// limit accepted connections.
    #[serde(alias = "max_connections")]
    pub max_in_flight: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8889".to_string(),
            max_in_flight: 1_000,
        }
    }
}

/// Translation backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// API base URL; `/chat/completions` is appended.
    pub base_url: String,

    pub model: String,

    /// Bearer token. Falls back to the `api_key_env` variable when empty.
    pub api_key: String,

    pub api_key_env: String,

    pub temperature: f32,

    /// Timeout for a single HTTP attempt, in seconds.
    pub timeout_secs: u64,

    /// Budget for the whole dispatch including retries, in seconds.
    pub deadline_secs: u64,

    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Instruction placed at `{{PROMPT_PREFIX}}`.
    pub prompt_prefix: String,

    /// File whose trimmed contents replace `prompt_prefix`. Relative paths
    /// resolve against the config file's directory.
    pub prompt_prefix_file: Option<String>,

    pub prompt_template: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.3,
            timeout_secs: 20,
            deadline_secs: 50,
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
            prompt_prefix: "Translate the following text".to_string(),
            prompt_prefix_file: None,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum `text` length in characters.
    pub max_text_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Three-letter codes accepted on top of the built-in ISO 639-2 list.
    pub extra_codes: Vec<String>,
}

/// Translation cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,

    /// JSONL file the cache is loaded from and saved to.
    pub path: String,

    /// Count at which a cached translation is served without a backend call.
    pub threshold: u64,

    /// Entries unused for this many days are dropped at startup.
    pub cleanup_days: i64,

    /// Periodic save interval in seconds (0 disables).
    pub autosave_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "trans_cache.jsonl".to_string(),
            threshold: 5,
            cleanup_days: 30,
            autosave_secs: 300,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 90 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Send `Access-Control-Allow-Origin: *`.
    pub cors_allow_any: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024,
            cors_allow_any: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive (overridden by `RUST_LOG`).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "transbasket=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
