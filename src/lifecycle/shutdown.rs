//! Shutdown coordination.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::health::ReadinessSignal;

/// Coordinator for graceful shutdown.
///
/// Flips readiness off first so health checkers stop routing traffic here,
/// then broadcasts to every long-running task.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    readiness: Arc<dyn ReadinessSignal>,
}

impl Shutdown {
    pub fn new(readiness: Arc<dyn ReadinessSignal>) -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx, readiness }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Mark not ready and trigger the shutdown signal.
    pub fn trigger(&self) {
        self.readiness.not_ready();
        let _ = self.tx.send(());
    }

    /// Number of tasks still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
