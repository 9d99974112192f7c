//! Shutdown broadcast shared by the HTTP server and signal handling.

use tokio::sync::broadcast;

/// Fans a single stop request out to every serving task.
///
/// The server holds a receiver from [`Shutdown::subscribe`]; `signals` calls
/// [`Shutdown::trigger`] on Ctrl-C or SIGTERM.
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

    /// Stop every subscriber. Triggering with no subscribers is a no-op.
    pub fn trigger(&self) {
        let listeners = self.tx.send(()).unwrap_or(0);
        tracing::debug!(listeners, "Shutdown triggered");
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
