//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Cache load + cleanup → Backend client → AppState → Listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Mark unavailable → Stop accepting → Drain → Save cache
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown (second one forces exit)
//!     SIGHUP → Save the translation cache, keep serving
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listeners
//! - Ordered shutdown: stop accept, drain, persist
//! - Readiness flips before draining so `/health` reports the shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{Gateway, StartupError};
