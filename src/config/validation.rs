//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, deadline under the client budget)
//! - Check addresses, URLs and language codes parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs after secrets and prompt files are resolved

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::translation::languages::is_code_shaped;

/// Callers give up after 60 seconds; the backend budget must fit inside.
pub const MAX_DEADLINE_SECS: u64 = 59;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_in_flight == 0 {
        errors.push(ValidationError::new("listener.max_in_flight", "must be at least 1"));
    }

    let backend = &config.backend;
    match Url::parse(&backend.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(_) => errors.push(ValidationError::new("backend.base_url", "must use http or https")),
        Err(e) => errors.push(ValidationError::new("backend.base_url", e.to_string())),
    }
    if backend.model.trim().is_empty() {
        errors.push(ValidationError::new("backend.model", "is required"));
    }
    if backend.api_key.trim().is_empty() {
        errors.push(ValidationError::new(
            "backend.api_key",
            format!("is required (set it or export {})", backend.api_key_env),
        ));
    }
    if backend.prompt_prefix.trim().is_empty() {
        errors.push(ValidationError::new("backend.prompt_prefix", "must not be empty"));
    }
    if backend.prompt_template.trim().is_empty() {
        errors.push(ValidationError::new("backend.prompt_template", "must not be empty"));
    }
    if !(0.0..=2.0).contains(&backend.temperature) {
        errors.push(ValidationError::new("backend.temperature", "must be between 0 and 2"));
    }
    if backend.timeout_secs == 0 {
        errors.push(ValidationError::new("backend.timeout_secs", "must be at least 1"));
    }
    if backend.deadline_secs == 0 || backend.deadline_secs > MAX_DEADLINE_SECS {
        errors.push(ValidationError::new(
            "backend.deadline_secs",
            format!("must be between 1 and {}", MAX_DEADLINE_SECS),
        ));
    } else if backend.deadline_secs < backend.timeout_secs {
        errors.push(ValidationError::new(
            "backend.deadline_secs",
            "must not be shorter than backend.timeout_secs",
        ));
    }
    if backend.max_attempts == 0 {
        errors.push(ValidationError::new("backend.max_attempts", "must be at least 1"));
    }
    if backend.max_delay_ms < backend.base_delay_ms {
        errors.push(ValidationError::new(
            "backend.max_delay_ms",
            "must not be smaller than backend.base_delay_ms",
        ));
    }

    if config.validation.max_text_chars == 0 {
        errors.push(ValidationError::new("validation.max_text_chars", "must be at least 1"));
    }

    for code in &config.languages.extra_codes {
        if !is_code_shaped(code) {
            errors.push(ValidationError::new(
                "languages.extra_codes",
                format!("'{}' is not a three-letter code", code),
            ));
        }
    }

    if config.cache.enabled {
        if config.cache.path.trim().is_empty() {
            errors.push(ValidationError::new("cache.path", "is required when the cache is enabled"));
        }
        if config.cache.threshold == 0 {
            errors.push(ValidationError::new("cache.threshold", "must be at least 1"));
        }
    }

    if config.timeouts.request_secs <= backend.deadline_secs {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must exceed backend.deadline_secs",
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be at least 1"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.backend.api_key = "sk-test".to_string();
        config
    }

    #[test]
    fn test_defaults_with_key_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let errors = validate_config(&GatewayConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "backend.api_key");
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = valid();
        config.listener.bind_address = "nope".to_string();
        config.backend.base_url = "ftp://example.com".to_string();
        config.backend.model = String::new();
        config.backend.deadline_secs = 60;
        config.languages.extra_codes = vec!["tlh".to_string(), "klingon".to_string()];

        let fields: Vec<_> = validate_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "backend.base_url",
                "backend.model",
                "backend.deadline_secs",
                "languages.extra_codes",
            ]
        );
    }

    #[test]
    fn test_deadline_must_cover_attempt_timeout() {
        let mut config = valid();
        config.backend.timeout_secs = 30;
        config.backend.deadline_secs = 10;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "backend.deadline_secs");
    }

    #[test]
    fn test_disabled_cache_skips_cache_checks() {
        let mut config = valid();
        config.cache.enabled = false;
        config.cache.threshold = 0;
        assert!(validate_config(&config).is_ok());
    }
}
