//! Diagnostic echo dispatcher.
//!
//! Answers every request with a description of how it was classified. Useful
//! for smoke-testing a deployment before a real executor is wired in.

use std::fmt::Write;

use axum::http::header;

use crate::dispatch::{DispatchError, QueryDispatcher};
use crate::routing::RequestContext;

#[derive(Debug, Clone, Copy, Default)]
pub struct EchoDispatcher;

impl EchoDispatcher {
    pub fn new() -> Self {
        Self
    }

    fn render(ctx: &RequestContext) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "path = {}", ctx.raw_path);
        let _ = writeln!(
            body,
            "versioned_path = {}, sub_path = {}, method = {}",
            ctx.versioned_path,
            ctx.sub_path,
            ctx.effective_method()
        );
        let _ = writeln!(body, "version = {}, kind = {}", ctx.api_version, ctx.request_kind);
        let content_type = ctx
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");
        let _ = writeln!(body, "body = {} bytes ({})", ctx.body.len(), content_type);
        match ctx.caller_id {
            Some(id) => {
                let _ = writeln!(body, "caller = {}", id);
            }
            None => {
                let _ = writeln!(body, "caller = anonymous");
            }
        }
        body
    }
}

#[async_trait::async_trait]
impl QueryDispatcher for EchoDispatcher {
    async fn dispatch(&self, ctx: &RequestContext) -> Result<String, DispatchError> {
        Ok(Self::render(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{FormValues, RequestKind};
    use axum::body::Bytes;
    use axum::http::{HeaderMap, HeaderValue, Method};

    #[tokio::test]
    async fn test_echo_body() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let ctx = RequestContext {
            http_method: Method::GET,
            raw_path: "/api/v2/search".into(),
            versioned_path: "/api/v2/search/".into(),
            api_version: 2,
            sub_path: "search/".into(),
            caller_id: Some(7),
            request_kind: RequestKind::Coordinate,
            params: FormValues::default(),
            headers,
            body: Bytes::from_static(br#"{"q":1}"#),
        };

        let body = EchoDispatcher::new().dispatch(&ctx).await.unwrap();
        assert_eq!(
            body,
            "path = /api/v2/search\n\
             versioned_path = /api/v2/search/, sub_path = search/, method = HIT\n\
             version = 2, kind = COORDINATE\n\
             body = 7 bytes (application/json)\n\
             caller = 7\n"
        );
    }
}
