//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router mounting the classifier under the API prefix
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener and serve until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::dispatch::QueryDispatcher;
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::observability::PrometheusRecorder;
use crate::routing::{PatternTable, RequestClassifier};
use crate::security::HeaderIdentity;

/// Error type for server construction and serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to compile path patterns: {0}")]
    Patterns(#[from] regex::Error),

    #[error("invalid identity header: {0}")]
    IdentityHeader(#[from] axum::http::header::InvalidHeaderName),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the versioned API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a server with the default collaborators (header identity,
    /// Prometheus recorder) around the given dispatcher.
    pub fn new(
        config: ServiceConfig,
        dispatcher: Arc<dyn QueryDispatcher>,
    ) -> Result<Self, ServerError> {
        let patterns = Arc::new(PatternTable::compile()?);
        let identity = Arc::new(HeaderIdentity::from_config(&config.identity)?);
        let metrics = Arc::new(PrometheusRecorder::new(config.service.name.clone()));

        let classifier =
            RequestClassifier::new(&config.http, patterns, identity, dispatcher, metrics);
        Ok(Self::with_classifier(config, classifier))
    }

    /// Create a server around a fully assembled classifier.
    pub fn with_classifier(config: ServiceConfig, classifier: RequestClassifier) -> Self {
        let router = Self::build_router(&config, Arc::new(classifier));
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, classifier: Arc<RequestClassifier>) -> Router {
        let prefix = classifier.mount_prefix().to_string();

        let router = if prefix.is_empty() {
            Router::new()
                .route("/", any(classify_handler))
                .route("/{*path}", any(classify_handler))
        } else {
            Router::new()
                .route(&prefix, any(classify_handler))
                .route(&format!("{}/", prefix), any(classify_handler))
                .route(&format!("{}/{{*path}}", prefix), any(classify_handler))
        };

        let timeout = Duration::from_secs(config.http.request_timeout_secs);

        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(timeout))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID));

        router.with_state(classifier).layer(layers)
    }

    /// Router with all layers applied (for embedding or in-process testing).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount = %self.config.http.mount_prefix(),
            cors = self.config.http.cors,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn classify_handler(
    State(classifier): State<Arc<RequestClassifier>>,
    request: Request<Body>,
) -> Response {
    classifier.handle(request).await
}
