//! Resilience primitives for backend calls.
//!
//! # Data Flow
//! ```text
//! Dispatch to translation backend:
//!     → timeouts.rs (overall deadline around every attempt)
//!     → attempt fails: retries.rs (classify, consult the policy,
//!       exponential delay with jitter before the next attempt)
//! ```
//!
//! # Design Decisions
//! - Every backend call runs under a deadline
//! - Only transport errors, 429 and 5xx are retried; 4xx is final
//! - A retry never outlives the overall deadline

pub mod retries;
pub mod timeouts;
