//! Request and response types for the translation endpoint.

use serde::{Deserialize, Serialize};

use crate::translation::validator::Violation;

/// A translation request that passed every validation rule.
///
/// `timestamp` and `uuid` are the caller's bytes, untouched. Language codes
/// are lower-cased; `text` is kept exactly as sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub timestamp: String,
    pub uuid: String,
    pub from: String,
    pub to: String,
    pub text: String,
}

/// Successful `/translate` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub timestamp: String,
    pub uuid: String,
    pub from: String,
    pub to: String,
    pub text: String,
    pub translated_text: String,
    /// True when the translation was served from the local cache.
    pub cached: bool,
}

impl TranslationResponse {
    pub fn new(request: NormalizedRequest, translated_text: String, cached: bool) -> Self {
        Self {
            timestamp: request.timestamp,
            uuid: request.uuid,
            from: request.from,
            to: request.to,
            text: request.text,
            translated_text,
            cached,
        }
    }
}

/// Error body shared by every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            field: None,
            violations: Vec::new(),
            uuid: None,
            timestamp: None,
        }
    }

    pub fn with_correlation(mut self, uuid: Option<String>, timestamp: Option<String>) -> Self {
        self.uuid = uuid;
        self.timestamp = timestamp;
        self
    }
}

/// One failed field rule as reported on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationBody {
    pub field: String,
    pub error_code: String,
    pub message: String,
}

impl From<&Violation> for ViolationBody {
    fn from(v: &Violation) -> Self {
        Self {
            field: v.field.to_string(),
            error_code: v.kind.code().to_string(),
            message: v.message.clone(),
        }
    }
}

