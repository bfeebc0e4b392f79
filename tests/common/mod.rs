//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::http::request::Parts;
use query_gateway::config::ServiceConfig;
use query_gateway::dispatch::{DispatchError, QueryDispatcher};
use query_gateway::health::Readiness;
use query_gateway::lifecycle::Shutdown;
use query_gateway::observability::{MetricsRecorder, Outcome};
use query_gateway::routing::{PatternTable, RequestClassifier, RequestContext};
use query_gateway::security::{IdentityError, IdentityResolver};
use query_gateway::HttpServer;
use tokio::net::TcpListener;

/// Dispatcher answering from a closure and remembering what it saw.
pub struct ProgrammableDispatcher<F> {
    f: F,
    pub seen: Mutex<Vec<RequestContext>>,
}

impl<F> ProgrammableDispatcher<F>
where
    F: Fn(&RequestContext) -> Result<String, DispatchError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            seen: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl<F> QueryDispatcher for ProgrammableDispatcher<F>
where
    F: Fn(&RequestContext) -> Result<String, DispatchError> + Send + Sync,
{
    async fn dispatch(&self, ctx: &RequestContext) -> Result<String, DispatchError> {
        self.seen.lock().unwrap().push(ctx.clone());
        (self.f)(ctx)
    }
}

/// Identity resolver that counts calls and delegates to the header resolver
/// semantics: `x-user-id` numeric, otherwise anonymous; `deny` header fails.
#[derive(Default)]
pub struct CountingIdentity {
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl IdentityResolver for CountingIdentity {
    async fn resolve(&self, parts: &Parts) -> Result<Option<i64>, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = parts.headers.get("deny") {
            return Err(IdentityError::Rejected(
                reason.to_str().unwrap_or("denied").to_string(),
            ));
        }
        Ok(parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok()))
    }
}

/// Recorder capturing every score.
#[derive(Default)]
pub struct CapturingRecorder {
    pub scores: Mutex<Vec<(String, String, String, Outcome)>>,
}

impl MetricsRecorder for CapturingRecorder {
    fn score(&self, method: &str, path: &str, phase: &str, _started: Instant, outcome: Outcome) {
        self.scores.lock().unwrap().push((
            method.to_string(),
            path.to_string(),
            phase.to_string(),
            outcome,
        ));
    }
}

/// Spawn a gateway on an ephemeral port. Trigger the returned `Shutdown` to stop it.
pub async fn spawn_gateway(
    config: ServiceConfig,
    identity: Arc<dyn IdentityResolver>,
    dispatcher: Arc<dyn QueryDispatcher>,
    metrics: Arc<dyn MetricsRecorder>,
) -> (SocketAddr, Shutdown) {
    let classifier = RequestClassifier::new(
        &config.http,
        Arc::new(PatternTable::compile().unwrap()),
        identity,
        dispatcher,
        metrics,
    );
    let server = HttpServer::with_classifier(config, classifier);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new(Arc::new(Readiness::new()));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
