//! Retry policy for translation backend calls.
//!
//! # Responsibilities
//! - Classify an upstream HTTP status as retryable or final
//! - Bound the number of attempts and the delay between them
//!
//! # Backoff
//! ```text
//! attempt 2: base        (+ up to 10% jitter)
//! attempt 3: base * 2
//! attempt n: base * 2^(n-2), capped at max_delay_ms before jitter
//! ```
//!
//! # Design Decisions
//! - Connection errors and timeouts are always retryable
//! - 429 and 5xx are retryable; every other 4xx is a caller or credential
//!   problem that another attempt will not fix

use std::time::Duration;

use rand::Rng;

/// Whether an upstream status code deserves another attempt.
pub fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Attempt budget and backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Always at least 1.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, 0, 0)
    }

    /// Delay before attempt `next_attempt` (1-based), or `None` once the
    /// budget is spent.
    pub fn delay_before(&self, next_attempt: u32) -> Option<Duration> {
        if next_attempt <= 1 || next_attempt > self.max_attempts {
            return None;
        }
        let ceiling = self.ceiling_ms(next_attempt);
        let jitter = rand::thread_rng().gen_range(0..=ceiling / 10);
        Some(Duration::from_millis(ceiling.saturating_add(jitter)))
    }

    /// Un-jittered delay before `next_attempt`.
    fn ceiling_ms(&self, next_attempt: u32) -> u64 {
        let doublings = next_attempt.saturating_sub(2).min(63);
        self.base_delay_ms
            .saturating_mul(1u64 << doublings)
            .min(self.max_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000, 8000)
    }
}
