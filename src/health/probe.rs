//! Liveness and readiness probe endpoints.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::health::Readiness;

#[derive(Debug, Serialize)]
pub struct ProbeStatus {
    pub status: &'static str,
}

/// Router serving `/live` and `/ready`.
pub fn probe_router(readiness: Arc<Readiness>) -> Router {
    Router::new()
        .route("/live", get(live))
        .route("/ready", get(ready))
        .with_state(readiness)
}

async fn live() -> Json<ProbeStatus> {
    Json(ProbeStatus { status: "alive" })
}

async fn ready(State(readiness): State<Arc<Readiness>>) -> (StatusCode, Json<ProbeStatus>) {
    if readiness.is_ready() {
        (StatusCode::OK, Json(ProbeStatus { status: "ready" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeStatus { status: "not_ready" }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ReadinessSignal;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn probe(readiness: Arc<Readiness>, uri: &str) -> (StatusCode, String) {
        let response = probe_router(readiness)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_ready_follows_flag() {
        let readiness = Arc::new(Readiness::new());

        let (status, body) = probe(readiness.clone(), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, r#"{"status":"not_ready"}"#);

        readiness.ready();
        let (status, body) = probe(readiness.clone(), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ready"}"#);
    }

    #[tokio::test]
    async fn test_live_always_ok() {
        let (status, _) = probe(Arc::new(Readiness::new()), "/live").await;
        assert_eq!(status, StatusCode::OK);
    }
}
