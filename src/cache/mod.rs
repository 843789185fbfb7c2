//! Translation cache.
//!
//! # Responsibilities
//! - Remember backend translations keyed by `(from, to, text)`
//! - Serve a translation locally once it has been confirmed often enough
//! - Persist entries as JSON lines and expire stale ones
//!
//! # Data Flow
//! ```text
//! dispatch(request)
//!     → serve_if_hot (count >= threshold) → cached response
//!     → otherwise backend call
//!         → record: add / bump count / replace and reset count
//! ```
//!
//! # Design Decisions
//! - `DashMap` shards keep lookups concurrent; no guard is ever held across
//!   an await point
//! - Saves write a temporary file and rename it into place

pub mod store;
pub mod types;

pub use store::TranslationCache;
pub use types::{CacheEntry, CacheError, CacheStats, RecordOutcome};
