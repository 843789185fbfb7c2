//! Configuration loading from disk.
//!
//! # Data Flow
//! ```text
//! TOML file (or defaults when absent)
//!     → CLI overrides (applied by the caller)
//!     → resolve: API key from environment, prompt prefix file
//!     → validate_config
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Prompt prefix file {}: {reason}", path.display())]
    PromptFile { path: PathBuf, reason: String },
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a config file without resolving or validating it.
///
/// A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(GatewayConfig::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Fill in secrets and file-backed values, then validate.
///
/// `base_dir` anchors relative `prompt_prefix_file` paths.
pub fn finalize(mut config: GatewayConfig, base_dir: &Path) -> Result<GatewayConfig, ConfigError> {
    resolve_with(&mut config, base_dir, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load, resolve and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config = read_config(path)?;
    finalize(config, &config_dir(path))
}

/// Directory relative paths in `path` are resolved against.
pub fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn resolve_with(
    config: &mut GatewayConfig,
    base_dir: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let backend = &mut config.backend;

    if backend.api_key.trim().is_empty() {
        if let Some(key) = env(&backend.api_key_env).filter(|k| !k.trim().is_empty()) {
            backend.api_key = key.trim().to_string();
        }
    }

    if let Some(file) = &backend.prompt_prefix_file {
        let path = base_dir.join(file);
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::PromptFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let prefix = content.trim();
        if prefix.is_empty() {
            return Err(ConfigError::PromptFile {
                path,
                reason: "file is empty".to_string(),
            });
        }
        tracing::debug!(path = %path.display(), "Loaded prompt prefix");
        backend.prompt_prefix = prefix.to_string();
    }

    Ok(())
}
