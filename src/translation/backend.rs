//! Translation backend capability.
//!
//! The dispatcher only sees the [`Translator`] trait, so the OpenAI client
//! and test stubs are interchangeable.

use async_trait::async_trait;
use thiserror::Error;

/// A failed backend call, classified for the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    /// Whether a later attempt could succeed (maps to 503 + Retry-After).
    pub retryable: bool,
    /// Upstream HTTP status, when one was received.
    pub status: Option<u16>,
}

impl BackendError {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
            status: None,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn timeout(after: std::time::Duration) -> Self {
        Self::retryable(format!("translation backend timed out after {:?}", after))
    }

    pub fn empty_output() -> Self {
        Self::fatal("translation backend returned no text")
    }
}

/// One-method translation capability.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `from` to `to` (normalized ISO 639-2 codes).
    async fn translate(&self, from: &str, to: &str, text: &str) -> Result<String, BackendError>;

    /// Short label for logs.
    fn name(&self) -> &str {
        "translator"
    }
}
