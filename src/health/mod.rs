//! Health signalling subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle (startup/shutdown)
//!     → readiness.rs (flip Ready / NotReady)
//!
//! External health checker
//!     → probe.rs (GET /live, GET /ready on the probe listener)
//!     → reads readiness.rs
//! ```
//!
//! # Design Decisions
//! - Readiness is independent of request handling; the classifier never reads it
//! - Probes live on their own listener so they never collide with the API mount

pub mod probe;
pub mod readiness;

pub use probe::probe_router;
pub use readiness::{Readiness, ReadinessSignal};
