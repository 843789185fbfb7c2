//! Shutdown coordination for the gateway.

use std::sync::Arc;

use tokio::sync::watch;

/// Process-wide shutdown flag.
///
/// Clones share one flag. Triggering is sticky: a task that subscribes
/// after the trigger still sees it, so startup ordering cannot lose it.
#[derive(Debug, Clone)]
pub struct Shutdown {
    flag: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self { flag: Arc::new(flag) }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.flag.subscribe(),
        }
    }

    /// Raise the flag. Idempotent.
    pub fn trigger(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.flag.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Awaitable view of a [`Shutdown`] flag, handed to long-running tasks.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once the flag is raised, immediately if it already is.
    pub async fn triggered(&mut self) {
        // An error means every `Shutdown` handle is gone; nothing can keep us alive.
        let _ = self.rx.wait_for(|raised| *raised).await;
    }
}
