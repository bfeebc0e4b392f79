//! Readiness signalling.
//!
//! # States
//! - Ready: the service accepts traffic
//! - NotReady: starting up or draining
//!
//! # State Transitions
//! ```text
//! NotReady → Ready:    listener bound, subsystems initialized
//! Ready → NotReady:    shutdown signal received
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

/// Two-state readiness flag consulted by external health checks.
pub trait ReadinessSignal: Send + Sync {
    fn ready(&self);
    fn not_ready(&self);
}

/// Atomic readiness flag. Starts not ready.
#[derive(Debug, Default)]
pub struct Readiness {
    ready: AtomicBool,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

impl ReadinessSignal for Readiness {
    fn ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            tracing::info!("Service ready");
        }
    }

    fn not_ready(&self) {
        if self.ready.swap(false, Ordering::AcqRel) {
            tracing::info!("Service not ready");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let readiness = Readiness::new();
        assert!(!readiness.is_ready());

        readiness.ready();
        readiness.ready();
        assert!(readiness.is_ready());

        readiness.not_ready();
        assert!(!readiness.is_ready());
    }
}
