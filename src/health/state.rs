//! Backend readiness flag.
//!
//! # States
//! - Ready: `/health` answers 200 and translations are dispatched
//! - Unavailable: `/health` answers 503
//!
//! # State Transitions
//! ```text
//! Unavailable → Ready: gateway finished startup
//! Ready → Unavailable: shutdown began
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared readiness flag, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    ready: Arc<AtomicBool>,
}

impl Readiness {
    pub fn new(ready: bool) -> Self {
        Self {
            ready: Arc::new(AtomicBool::new(ready)),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            tracing::info!("Backend marked ready");
        }
    }

    pub fn mark_unavailable(&self) {
        if self.ready.swap(false, Ordering::AcqRel) {
            tracing::warn!("Backend marked unavailable");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_shared_between_clones() {
        let readiness = Readiness::new(false);
        let observer = readiness.clone();
        assert!(!observer.is_ready());

        readiness.mark_ready();
        assert!(observer.is_ready());

        readiness.mark_unavailable();
        assert!(!observer.is_ready());
    }
}
