//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define the recorder contract the classifier scores requests through
//! - Expose Prometheus-compatible metrics endpoint
//! - Guarantee exactly one score per request, on every exit path
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, path, phase, outcome
//! - `api_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Recording is fire-and-forget: it never fails and never alters a response
//! - Low-overhead metric updates (atomic operations in the `metrics` facade)
//! - Histogram buckets come from configuration
//! - The `path` label is the full percent-decoded, normalized versioned path,
//!   so every distinct URL is its own series. Paths that embed IDs
//!   (`/api/v1/users/42/`) make the label cardinality unbounded; deployments
//!   exposing such paths should drop or relabel `path` at scrape time

use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use metrics::Label;
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "api_requests_total";
pub const REQUEST_DURATION: &str = "api_request_duration_seconds";

/// Phase label for the whole-request scope.
pub const PHASE_TOTAL: &str = "total";

/// Result of a scored operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Sink for timed request outcomes. Must tolerate concurrent calls.
pub trait MetricsRecorder: Send + Sync {
    fn score(&self, method: &str, path: &str, phase: &str, started: Instant, outcome: Outcome);
}

/// Records into the global `metrics` registry.
#[derive(Debug, Clone)]
pub struct PrometheusRecorder {
    service: String,
}

impl PrometheusRecorder {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl MetricsRecorder for PrometheusRecorder {
    fn score(&self, method: &str, path: &str, phase: &str, started: Instant, outcome: Outcome) {
        let labels = vec![
            Label::new("service", self.service.clone()),
            Label::new("method", method.to_owned()),
            Label::new("path", path.to_owned()),
            Label::new("phase", phase.to_owned()),
            Label::new("outcome", outcome.as_str()),
        ];

        metrics::counter!(REQUESTS_TOTAL, labels.clone()).increment(1);
        metrics::histogram!(REQUEST_DURATION, labels).record(started.elapsed().as_secs_f64());
    }
}

/// Scores its phase when dropped.
///
/// Created at request entry. The outcome starts as `Failure` and only
/// becomes `Success` when the handler says so, so early returns, errors and
/// cancelled futures are all scored as failures.
pub struct MetricsScope {
    recorder: Arc<dyn MetricsRecorder>,
    method: String,
    path: String,
    phase: &'static str,
    started: Instant,
    outcome: Outcome,
}

impl MetricsScope {
    pub fn start(
        recorder: Arc<dyn MetricsRecorder>,
        method: impl Into<String>,
        path: impl Into<String>,
        phase: &'static str,
    ) -> Self {
        Self {
            recorder,
            method: method.into(),
            path: path.into(),
            phase,
            started: Instant::now(),
            outcome: Outcome::Failure,
        }
    }

    pub fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = outcome;
    }

    pub fn succeed(&mut self) {
        self.set_outcome(Outcome::Success);
    }
}

impl Drop for MetricsScope {
    fn drop(&mut self) {
        // A misbehaving recorder must not take the response down with it.
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.recorder.score(
                &self.method,
                &self.path,
                self.phase,
                self.started,
                self.outcome,
            );
        }));
    }
}

/// Install the Prometheus exporter HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_exporter(addr: SocketAddr, buckets: &[f64]) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), buckets)?
        .install()?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}
