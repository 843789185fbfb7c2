//! Backend dispatch.
//!
//! # Responsibilities
//! - Serve confirmed translations from the cache
//! - Bound the number of backend calls in flight
//! - Call the translation backend under an overall deadline
//! - Classify timeouts and empty output as backend failures
//! - Feed successful translations back into the cache
//!
//! No semantic validation happens here; requests arrive already
//! normalized. Correlation fields are never read or rewritten.
//!
//! The deadline covers the wait for a backend slot as well as the call
//! itself, so a request queued behind slow ones still fails with a
//! backend error rather than hanging until the HTTP timeout. Cache hits
//! never take a slot.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::cache::TranslationCache;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::translation::backend::{BackendError, Translator};
use crate::translation::text::truncate_for_log;
use crate::translation::types::NormalizedRequest;

/// Log previews of request text are cut to this many characters.
const LOG_PREVIEW_CHARS: usize = 50;

/// Result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub cached: bool,
}

/// Owns the backend handle; shared across requests behind an `Arc`.
pub struct Dispatcher {
    backend: Arc<dyn Translator>,
    deadline: Duration,
    cache: Option<TranslationCache>,
    cache_threshold: u64,
    slots: Option<Semaphore>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn Translator>, deadline: Duration) -> Self {
        Self {
            backend,
            deadline,
            cache: None,
            cache_threshold: u64::MAX,
            slots: None,
        }
    }

    /// Allow at most `max_in_flight` concurrent backend calls; the rest wait
    /// inside their deadline.
    pub fn with_slot_limit(mut self, max_in_flight: usize) -> Self {
        self.slots = Some(Semaphore::new(max_in_flight.max(1)));
        self
    }

    /// Serve translations seen at least `threshold` times from `cache`.
    pub fn with_cache(mut self, cache: TranslationCache, threshold: u64) -> Self {
        self.cache = Some(cache);
        self.cache_threshold = threshold.max(1);
        self
    }

    pub fn cache(&self) -> Option<&TranslationCache> {
        self.cache.as_ref()
    }

    pub async fn dispatch(&self, request: &NormalizedRequest) -> Result<Translation, BackendError> {
        tracing::info!(
            uuid = %request.uuid,
            from = %request.from,
            to = %request.to,
            text = %truncate_for_log(&request.text, LOG_PREVIEW_CHARS),
            "Dispatching translation"
        );

        if let Some(cache) = &self.cache {
            let hit = cache.serve_if_hot(&request.from, &request.to, &request.text, self.cache_threshold);
            metrics::record_cache_lookup(hit.is_some());
            if let Some(text) = hit {
                tracing::info!(uuid = %request.uuid, "Served translation from cache");
                return Ok(Translation { text, cached: true });
            }
        }

        let text = with_deadline(self.deadline, self.call_backend(request))
            .await
            .map_err(|e| BackendError::timeout(e.0))
            .and_then(|result| result)
            .and_then(|text| {
                if text.trim().is_empty() {
                    Err(BackendError::empty_output())
                } else {
                    Ok(text)
                }
            })
            .inspect_err(|error| {
                metrics::record_backend_error(error.retryable);
                tracing::warn!(
                    uuid = %request.uuid,
                    backend = self.backend.name(),
                    retryable = error.retryable,
                    status = ?error.status,
                    error = %error,
                    "Translation backend failed"
                );
            })?;

        if let Some(cache) = &self.cache {
            let outcome = cache.record(&request.from, &request.to, &request.text, &text);
            tracing::debug!(uuid = %request.uuid, outcome = ?outcome, "Recorded translation in cache");
        }

        tracing::info!(uuid = %request.uuid, "Translation completed");
        Ok(Translation { text, cached: false })
    }

    async fn call_backend(&self, request: &NormalizedRequest) -> Result<String, BackendError> {
        let _permit = match &self.slots {
            Some(slots) => Some(
                slots
                    .acquire()
                    .await
                    .map_err(|_| BackendError::retryable("dispatch slots closed"))?,
            ),
            None => None,
        };
        self.backend
            .translate(&request.from, &request.to, &request.text)
            .await
    }
}
