//! Liveness and readiness.
//!
//! The gateway has a single dependency worth reporting: the translation
//! backend. Its readiness is an explicit flag owned by the application
//! state, flipped at startup and during shutdown.

pub mod state;

pub use state::Readiness;
