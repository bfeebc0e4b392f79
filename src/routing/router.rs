//! Request classification and dispatch.
//!
//! # Responsibilities
//! - Short-circuit CORS preflight
//! - Resolve caller identity
//! - Parse API version and method path from the percent-decoded URL path
//! - Buffer the request body and derive the request kind from form values
//! - Hand the classified request to the dispatcher and shape the response
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Every request gets its own `RequestContext`; nothing per-request is
//!   stored on the classifier
//! - A `MetricsScope` created at entry scores every exit path exactly once
//! - Each stage is terminal on failure: no retries, no recovery

use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};

use crate::config::HttpConfig;
use crate::dispatch::QueryDispatcher;
use crate::http::request::{form_values, read_body, request_id};
use crate::http::response::{cors_preflight, dispatched};
use crate::observability::{MetricsRecorder, MetricsScope, PHASE_TOTAL};
use crate::routing::context::{decode_path, normalize_path, RequestContext, RequestKind};
use crate::routing::error::ClassifyError;
use crate::routing::matcher::PatternTable;
use crate::security::IdentityResolver;

/// Front-door classifier for the versioned API mount.
pub struct RequestClassifier {
    mount_prefix: String,
    cors: bool,
    max_body_size: usize,
    patterns: Arc<PatternTable>,
    identity: Arc<dyn IdentityResolver>,
    dispatcher: Arc<dyn QueryDispatcher>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl RequestClassifier {
    pub fn new(
        config: &HttpConfig,
        patterns: Arc<PatternTable>,
        identity: Arc<dyn IdentityResolver>,
        dispatcher: Arc<dyn QueryDispatcher>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            mount_prefix: config.mount_prefix(),
            cors: config.cors,
            max_body_size: config.max_body_size,
            patterns,
            identity,
            dispatcher,
            metrics,
        }
    }

    /// Mount prefix in path form (`/api`), empty when mounted at the root.
    pub fn mount_prefix(&self) -> &str {
        &self.mount_prefix
    }

    /// Handle one request end to end.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();
        let path = decode_path(parts.uri.path());
        let versioned_path = normalize_path(&path);

        let mut scope = MetricsScope::start(
            self.metrics.clone(),
            parts.method.as_str(),
            versioned_path.clone(),
            PHASE_TOTAL,
        );

        if parts.method == Method::OPTIONS && self.cors {
            scope.succeed();
            return cors_preflight();
        }

        match self.process(&parts, body, &path, versioned_path).await {
            Ok(result) => {
                scope.succeed();
                dispatched(result)
            }
            Err(err) => {
                let status = err.status();
                if matches!(err, ClassifyError::Dispatch(_)) {
                    tracing::warn!(
                        request_id = %request_id(&parts),
                        method = %parts.method,
                        path = %parts.uri.path(),
                        status = status.as_u16(),
                        error = %err,
                        "Dispatch failed"
                    );
                } else {
                    tracing::debug!(
                        request_id = %request_id(&parts),
                        method = %parts.method,
                        path = %parts.uri.path(),
                        status = status.as_u16(),
                        error = %err,
                        "Request rejected"
                    );
                }
                err.into_response()
            }
        }
    }

    async fn process(
        &self,
        parts: &Parts,
        body: Body,
        path: &str,
        versioned_path: String,
    ) -> Result<String, ClassifyError> {
        let ctx = self.classify(parts, body, path, versioned_path).await?;

        tracing::debug!(
            request_id = %request_id(parts),
            version = ctx.api_version,
            sub_path = %ctx.sub_path,
            kind = %ctx.request_kind,
            "Request classified"
        );

        Ok(self.dispatcher.dispatch(&ctx).await?)
    }

    async fn classify(
        &self,
        parts: &Parts,
        body: Body,
        path: &str,
        versioned_path: String,
    ) -> Result<RequestContext, ClassifyError> {
        let caller_id = self
            .identity
            .resolve(parts)
            .await
            .map_err(|e| ClassifyError::Unauthorized(e.to_string()))?;

        let unmounted = self.strip_mount(path);
        let version = self.patterns.match_version(unmounted)?;

        let sub_path = &unmounted[version.consumed..];
        if sub_path.is_empty() {
            return Err(ClassifyError::MissingSubPath);
        }

        let body = read_body(parts, body, self.max_body_size).await?;
        let params = form_values(parts, &body);
        let request_kind = RequestKind::from_params(&params);

        Ok(RequestContext {
            http_method: parts.method.clone(),
            raw_path: path.to_string(),
            versioned_path,
            api_version: version.version,
            sub_path: normalize_path(sub_path),
            caller_id,
            request_kind,
            params,
            headers: parts.headers.clone(),
            body,
        })
    }

    /// Path after `<mount_prefix>/`, empty if the path stops at the mount.
    fn strip_mount<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.mount_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or("")
    }
}
