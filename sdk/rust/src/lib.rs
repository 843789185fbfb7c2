//! Rust client for the transbasket translation gateway.

pub mod client;

pub use client::{ClientError, HealthStatus, TranslateRequest, TranslateResult, TranslationClient};
