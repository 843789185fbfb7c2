//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - Translate signals to internal events
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A second SIGTERM/SIGINT forces exit without draining
//! - SIGHUP persists the cache and leaves the server running

use tokio::task::JoinHandle;

use crate::cache::TranslationCache;
use crate::lifecycle::shutdown::Shutdown;

/// Exit status used when a second interrupt skips draining.
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Terminate,
    SaveCache,
}

/// Spawn the signal loop for the lifetime of the process.
pub fn spawn_signal_handler(shutdown: Shutdown, cache: Option<TranslationCache>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut listener = match SignalListener::new() {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handlers");
                return;
            }
        };

        let mut terminating = false;
        loop {
            match listener.next().await {
                Event::Terminate if terminating => {
                    tracing::warn!("Second shutdown signal received, forcing exit");
                    std::process::exit(FORCED_EXIT_CODE);
                }
                Event::Terminate => {
                    tracing::info!("Shutdown signal received");
                    terminating = true;
                    shutdown.trigger();
                }
                Event::SaveCache => match &cache {
                    Some(cache) => save_cache(cache.clone()).await,
                    None => tracing::info!("SIGHUP received, cache disabled"),
                },
            }
        }
    })
}

/// Persist the cache off the async runtime threads.
pub async fn save_cache(cache: TranslationCache) {
    match tokio::task::spawn_blocking(move || cache.save()).await {
        Ok(Ok(saved)) => tracing::info!(entries = saved, "Translation cache saved"),
        Ok(Err(e)) => tracing::error!(error = %e, "Failed to save translation cache"),
        Err(e) => tracing::error!(error = %e, "Cache save task panicked"),
    }
}

#[cfg(unix)]
struct SignalListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalListener {
    fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    async fn next(&mut self) -> Event {
        tokio::select! {
            _ = self.interrupt.recv() => Event::Terminate,
            _ = self.terminate.recv() => Event::Terminate,
            _ = self.hangup.recv() => Event::SaveCache,
        }
    }
}

#[cfg(not(unix))]
struct SignalListener;

#[cfg(not(unix))]
impl SignalListener {
    fn new() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn next(&mut self) -> Event {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Event::Terminate,
            Err(e) => {
                tracing::error!(error = %e, "Ctrl+C handler failed");
                std::future::pending().await
            }
        }
    }
}
