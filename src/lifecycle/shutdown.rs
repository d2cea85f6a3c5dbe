//! Gateway shutdown.
//!
//! # Sequence
//! ```text
//! trigger() → listener stops accepting → in-flight requests drain
//!     → finish(): response cache written to its persistence file
//! ```

use tokio::sync::broadcast;

use crate::caching::MemoryCache;

/// Broadcast handle that stops the server and every task holding a receiver.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal. Safe to call more than once or with no subscribers.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve once `rx` sees the signal, or once its sender is gone.
pub async fn signalled(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
    tracing::info!("Shutdown signal received");
}

/// Last step after the listener has drained.
///
/// Writes the cache to its file when one is configured. Returns whether
/// the cache is safely on disk (or had nowhere to go).
pub fn finish(persistent_cache: Option<&MemoryCache>) -> bool {
    let Some(cache) = persistent_cache else {
        return true;
    };

    match cache.save_to_file() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, entries = cache.len(), "Failed to persist response cache");
            false
        }
    }
}
