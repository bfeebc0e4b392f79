//! Classification failures and their HTTP mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::http::request::BodyError;
use crate::routing::matcher::VersionError;

/// Terminal outcome of a request that did not produce a result.
///
/// `Display` yields the exact plain-text response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// Identity resolution failed; carries the resolver's message.
    #[error("{0}")]
    Unauthorized(String),

    #[error("API version not specified")]
    MissingVersion,

    #[error("invalid API version")]
    InvalidVersion,

    #[error("service method not specified")]
    MissingSubPath,

    #[error(transparent)]
    Body(#[from] BodyError),

    /// Downstream failure, passed through unchanged.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl ClassifyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ClassifyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ClassifyError::MissingVersion
            | ClassifyError::InvalidVersion
            | ClassifyError::MissingSubPath => StatusCode::BAD_REQUEST,
            ClassifyError::Body(BodyError::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            ClassifyError::Body(BodyError::Unreadable) => StatusCode::BAD_REQUEST,
            ClassifyError::Dispatch(e) => e.status,
        }
    }
}

impl From<VersionError> for ClassifyError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::NoVersionMatch => ClassifyError::MissingVersion,
            VersionError::InvalidVersion => ClassifyError::InvalidVersion,
        }
    }
}

impl IntoResponse for ClassifyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self),
        )
            .into_response()
    }
}
