//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Buffer the request body (bounded) for the dispatcher
//! - Extract form values from the query string and urlencoded bodies
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is read once; form values are parsed from the buffered bytes
//! - Body values precede query values, so they win on lookup

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{header, HeaderName, HeaderValue, Method, Request};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::FormValues;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID from the headers, or `"unknown"`.
pub fn request_id(parts: &Parts) -> &str {
    parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Why the request body could not be buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BodyError {
    #[error("request body too large")]
    TooLarge,

    #[error("unreadable request body")]
    Unreadable,
}

/// Whether the buffered body should be parsed as form values.
fn carries_form_body(parts: &Parts) -> bool {
    if !matches!(parts.method, Method::POST | Method::PUT | Method::PATCH) {
        return false;
    }
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Buffer the whole request body, at most `limit` bytes.
///
/// A declared `Content-Length` above the limit is rejected before reading.
pub async fn read_body(parts: &Parts, body: Body, limit: usize) -> Result<Bytes, BodyError> {
    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(BodyError::TooLarge);
    }

    axum::body::to_bytes(body, limit).await.map_err(|e| {
        tracing::warn!(
            request_id = %request_id(parts),
            error = %e,
            "Failed to read request body"
        );
        BodyError::Unreadable
    })
}

/// Collect form values: urlencoded body first (when applicable), then query.
pub fn form_values(parts: &Parts, body: &[u8]) -> FormValues {
    let mut values = FormValues::default();

    if carries_form_body(parts) {
        values.extend(FormValues::parse(body));
    }

    if let Some(query) = parts.uri.query() {
        values.extend(FormValues::parse(query.as_bytes()));
    }

    values
}
