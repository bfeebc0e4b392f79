//! Caller identity resolution.
//!
//! # Responsibilities
//! - Define the resolver contract the classifier calls once per request
//! - Provide a header-based resolver for deployments behind an
//!   authenticating edge
//!
//! # Design Decisions
//! - `None` (or an explicit zero ID) means anonymous; whether that is
//!   acceptable is the resolver's call
//! - Token validation belongs to the edge, not here
//! - Resolver messages become the 401 body verbatim

use axum::http::request::Parts;
use axum::http::HeaderName;
use thiserror::Error;

use crate::config::IdentityConfig;

/// Why a caller could not be identified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("missing {0} header")]
    Missing(String),

    #[error("invalid {0} header")]
    Malformed(String),

    #[error("{0}")]
    Rejected(String),
}

/// Resolves the caller of a request.
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Return the caller ID, `None` for an anonymous caller.
    async fn resolve(&self, parts: &Parts) -> Result<Option<i64>, IdentityError>;
}

/// Reads a numeric caller ID from a request header.
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    header: HeaderName,
    required: bool,
}

impl HeaderIdentity {
    pub fn new(header: HeaderName, required: bool) -> Self {
        Self { header, required }
    }

    /// Build from config. Fails if the configured header name is invalid.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, axum::http::header::InvalidHeaderName> {
        let header = HeaderName::from_bytes(config.header.as_bytes())?;
        Ok(Self::new(header, config.required))
    }
}

#[async_trait::async_trait]
impl IdentityResolver for HeaderIdentity {
    async fn resolve(&self, parts: &Parts) -> Result<Option<i64>, IdentityError> {
        let id = match parts.headers.get(&self.header) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|id| *id >= 0)
                .ok_or_else(|| IdentityError::Malformed(self.header.to_string()))?,
            None => 0,
        };

        // Zero is the anonymous caller
        match id {
            0 if self.required => Err(IdentityError::Missing(self.header.to_string())),
            0 => Ok(None),
            id => Ok(Some(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/users/");
        if let Some(value) = header {
            builder = builder.header("x-user-id", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn resolver(required: bool) -> HeaderIdentity {
        HeaderIdentity::new(HeaderName::from_static("x-user-id"), required)
    }

    #[tokio::test]
    async fn test_resolves_numeric_id() {
        let id = resolver(false).resolve(&parts(Some(" 42 "))).await.unwrap();
        assert_eq!(id, Some(42));
    }

    #[tokio::test]
    async fn test_anonymous_when_optional() {
        let id = resolver(false).resolve(&parts(None)).await.unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_missing_when_required() {
        let err = resolver(true).resolve(&parts(None)).await.unwrap_err();
        assert_eq!(err, IdentityError::Missing("x-user-id".into()));
        assert_eq!(err.to_string(), "missing x-user-id header");
    }

    #[tokio::test]
    async fn test_zero_is_anonymous() {
        assert_eq!(resolver(false).resolve(&parts(Some("0"))).await.unwrap(), None);

        let err = resolver(true).resolve(&parts(Some("0"))).await.unwrap_err();
        assert_eq!(err, IdentityError::Missing("x-user-id".into()));
    }

    #[tokio::test]
    async fn test_malformed_ids_rejected() {
        for value in ["abc", "-5", "", "1.5"] {
            let err = resolver(false).resolve(&parts(Some(value))).await.unwrap_err();
            assert_eq!(err, IdentityError::Malformed("x-user-id".into()), "value {:?}", value);
        }
    }

    #[test]
    fn test_from_config() {
        let config = IdentityConfig {
            header: "X-Caller".into(),
            required: true,
        };
        let resolver = HeaderIdentity::from_config(&config).unwrap();
        assert_eq!(resolver.header.as_str(), "x-caller");
        assert!(resolver.required);
    }
}
