//! Versioned API gateway library.
//!
//! Classifies requests against a `<mount>/v<N>/<method...>` URL scheme and
//! forwards them to a pluggable [`dispatch::QueryDispatcher`].

pub mod config;
pub mod dispatch;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RequestClassifier, RequestContext, RequestKind};
