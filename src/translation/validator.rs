//! Request validation pipeline.
//!
//! # Pipeline
//! ```text
//! decoded JSON body
//!     → schema     (object with five string fields)
//!     → uuid       (8-4-4-4-12 hex, case-insensitive)
//!     → timestamp  (YYYY-MM-DDTHH:MM:SS.sssZ, real calendar instant)
//!     → from / to  (closed ISO 639-2 allow-list)
//!     → text       (non-empty after trim, bounded length)
//!     → NormalizedRequest
//! ```
//!
//! Every rule is evaluated and every violation is collected, in pipeline
//! order. The first violation is the reported reason; the rest are returned
//! alongside it. Malformed JSON never gets here: the HTTP layer rejects it
//! before the validator runs.

use chrono::NaiveDateTime;
use serde_json::Value;
use thiserror::Error;

use crate::translation::languages::LanguageRegistry;
use crate::translation::types::NormalizedRequest;

/// Upper bound on `text` length, in characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 10_000;

const REQUIRED_FIELDS: [&str; 5] = ["timestamp", "uuid", "from", "to", "text"];

/// Classification of a failed field rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    SchemaInvalid,
    InvalidUuid,
    InvalidTimestamp,
    UnsupportedLanguage,
    EmptyText,
    TextTooLong,
}

impl ValidationKind {
    /// Stable machine-readable code used in error bodies and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationKind::SchemaInvalid => "SCHEMA_INVALID",
            ValidationKind::InvalidUuid => "INVALID_UUID",
            ValidationKind::InvalidTimestamp => "INVALID_TIMESTAMP",
            ValidationKind::UnsupportedLanguage => "UNSUPPORTED_LANGUAGE",
            ValidationKind::EmptyText => "EMPTY_TEXT",
            ValidationKind::TextTooLong => "TEXT_TOO_LONG",
        }
    }
}

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub kind: ValidationKind,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of a rejected request.
///
/// Carries the caller's `uuid` and `timestamp` when those fields were
/// themselves well-formed, so the error response can still be correlated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .violations[0].field, .violations[0].message)]
pub struct ValidationFailure {
    /// Never empty; the first entry is the reported reason.
    pub violations: Vec<Violation>,
    pub uuid: Option<String>,
    pub timestamp: Option<String>,
}

impl ValidationFailure {
    pub fn primary(&self) -> &Violation {
        &self.violations[0]
    }

    pub fn kind(&self) -> ValidationKind {
        self.primary().kind
    }
}

/// Borrowed view of the five wire fields, after the schema check.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub timestamp: Option<&'a str>,
    pub uuid: Option<&'a str>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub text: Option<&'a str>,
}

impl<'a> TranslationRequest<'a> {
    /// Pull the string fields out of a decoded body.
    ///
    /// Missing or non-string fields come back as `None` with a
    /// `SchemaInvalid` violation recorded for each.
    fn extract(body: &'a Value, violations: &mut Vec<Violation>) -> Option<Self> {
        let Some(object) = body.as_object() else {
            violations.push(Violation::new(
                "body",
                ValidationKind::SchemaInvalid,
                "request body must be a JSON object",
            ));
            return None;
        };

        let mut fields = [None; 5];
        for (slot, name) in fields.iter_mut().zip(REQUIRED_FIELDS) {
            match object.get(name) {
                Some(Value::String(s)) => *slot = Some(s.as_str()),
                Some(_) => violations.push(Violation::new(
                    name,
                    ValidationKind::SchemaInvalid,
                    format!("'{}' must be a string", name),
                )),
                None => violations.push(Violation::new(
                    name,
                    ValidationKind::SchemaInvalid,
                    format!("'{}' is required", name),
                )),
            }
        }

        let [timestamp, uuid, from, to, text] = fields;
        Some(Self {
            timestamp,
            uuid,
            from,
            to,
            text,
        })
    }
}

/// Pure validator; holds only immutable rule parameters.
#[derive(Debug, Clone)]
pub struct Validator {
    languages: LanguageRegistry,
    max_text_chars: usize,
}

impl Validator {
    pub fn new(languages: LanguageRegistry, max_text_chars: usize) -> Self {
        Self {
            languages,
            max_text_chars,
        }
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// Run the full pipeline over a decoded request body.
    pub fn validate(&self, body: &Value) -> Result<NormalizedRequest, ValidationFailure> {
        let mut violations = Vec::new();

        let Some(raw) = TranslationRequest::extract(body, &mut violations) else {
            return Err(ValidationFailure {
                violations,
                uuid: None,
                timestamp: None,
            });
        };

        let uuid = raw.uuid.filter(|u| {
            let ok = is_canonical_uuid(u);
            if !ok {
                violations.push(Violation::new(
                    "uuid",
                    ValidationKind::InvalidUuid,
                    "uuid must be a canonical 8-4-4-4-12 hexadecimal UUID",
                ));
            }
            ok
        });

        let timestamp = raw.timestamp.filter(|t| {
            let ok = is_utc_millis_timestamp(t);
            if !ok {
                violations.push(Violation::new(
                    "timestamp",
                    ValidationKind::InvalidTimestamp,
                    "timestamp must be an ISO-8601 UTC instant like 2025-10-10T01:23:45.678Z",
                ));
            }
            ok
        });

        let from = raw.from.and_then(|code| self.check_language("from", code, &mut violations));
        let to = raw.to.and_then(|code| self.check_language("to", code, &mut violations));

        let text = raw.text.filter(|t| {
            if t.trim().is_empty() {
                violations.push(Violation::new(
                    "text",
                    ValidationKind::EmptyText,
                    "text must not be empty",
                ));
                return false;
            }
            if t.chars().count() > self.max_text_chars {
                violations.push(Violation::new(
                    "text",
                    ValidationKind::TextTooLong,
                    format!("text exceeds {} characters", self.max_text_chars),
                ));
                return false;
            }
            true
        });

        match (timestamp, uuid, from, to, text) {
            (Some(timestamp), Some(uuid), Some(from), Some(to), Some(text)) if violations.is_empty() => {
                Ok(NormalizedRequest {
                    timestamp: timestamp.to_string(),
                    uuid: uuid.to_string(),
                    from,
                    to,
                    text: text.to_string(),
                })
            }
            _ => Err(ValidationFailure {
                violations,
                uuid: uuid.map(str::to_string),
                timestamp: timestamp.map(str::to_string),
            }),
        }
    }

    fn check_language(
        &self,
        field: &'static str,
        code: &str,
        violations: &mut Vec<Violation>,
    ) -> Option<String> {
        let normalized = self.languages.normalize(code);
        if normalized.is_none() {
            violations.push(Violation::new(
                field,
                ValidationKind::UnsupportedLanguage,
                format!("'{}' is not a supported ISO 639-2 language code", code),
            ));
        }
        normalized
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(LanguageRegistry::default(), DEFAULT_MAX_TEXT_CHARS)
    }
}

/// 36 characters, hyphens at 8/13/18/23 (zero-based), hex elsewhere.
pub fn is_canonical_uuid(s: &str) -> bool {
    s.len() == 36
        && s.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

/// `YYYY-MM-DDTHH:MM:SS.sssZ`, exactly three fractional digits, and a date
/// that exists on the calendar.
pub fn is_utc_millis_timestamp(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 24 {
        return false;
    }

    let shaped = bytes.iter().enumerate().all(|(i, &b)| match i {
        4 | 7 => b == b'-',
        10 => b == b'T',
        13 | 16 => b == b':',
        19 => b == b'.',
        23 => b == b'Z',
        _ => b.is_ascii_digit(),
    });

    shaped && NaiveDateTime::parse_from_str(&s[..23], "%Y-%m-%dT%H:%M:%S%.3f").is_ok()
}
