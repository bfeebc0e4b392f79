//! Downstream query dispatch.
//!
//! # Data Flow
//! ```text
//! RequestClassifier (fully populated RequestContext)
//!     → QueryDispatcher::dispatch
//!     → Ok(body)              → 200 with body
//!     → Err(DispatchError)    → status + message passed through unchanged
//! ```
//!
//! # Design Decisions
//! - The dispatcher owns execution; the classifier only validates
//! - No timeout imposed here: the request-level timeout layer cancels the
//!   whole future, dispatcher included
//! - `echo.rs` is the diagnostic reference dispatcher

use axum::http::StatusCode;
use thiserror::Error;

use crate::routing::RequestContext;

pub mod echo;

pub use echo::EchoDispatcher;

/// Failure reported by a dispatcher, with the status it wants surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DispatchError {
    pub status: StatusCode,
    pub message: String,
}

impl DispatchError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Executes a classified request.
#[async_trait::async_trait]
pub trait QueryDispatcher: Send + Sync {
    /// Execute the request and return the response body.
    async fn dispatch(&self, ctx: &RequestContext) -> Result<String, DispatchError>;
}
