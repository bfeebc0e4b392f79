//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms via MetricsScope)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through all log events
//! - Metrics are cheap (atomic increments) and never fail a request

pub mod logging;
pub mod metrics;

pub use self::metrics::{
    MetricsRecorder, MetricsScope, Outcome, PrometheusRecorder, PHASE_TOTAL,
};
