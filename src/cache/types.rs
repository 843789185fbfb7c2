//! Cache records and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One cached translation, as stored on disk (one JSON object per line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub id: u64,
    /// SHA-256 hex of `from|to|source`.
    pub hash: String,
    pub from: String,
    pub to: String,
    pub source: String,
    pub target: String,
    /// How many times the backend (or the cache) produced `target`.
    pub count: u64,
    /// Unix seconds.
    pub last_used: i64,
    /// Unix seconds.
    pub created_at: i64,
}

/// What `record` did with a fresh backend translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Added,
    Bumped,
    Replaced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total: usize,
    /// Entries whose count reached the serving threshold.
    pub active: usize,
    /// Entries not used within the cleanup window.
    pub expired: usize,
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
