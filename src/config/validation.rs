//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Validate histogram bucket layout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("service.name must not be empty")]
    EmptyServiceName,

    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("http.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("http.max_body_size must be greater than zero")]
    ZeroBodySize,

    #[error("identity.header: invalid header name {0:?}")]
    InvalidHeader(String),

    #[error("observability.log_format must be \"pretty\" or \"json\", got {0:?}")]
    InvalidLogFormat(String),

    #[error("observability.buckets must not be empty")]
    EmptyBuckets,

    #[error("observability.buckets must be positive, finite and strictly ascending")]
    InvalidBuckets,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::EmptyServiceName);
    }

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.health.enabled {
        check_address("health.bind_address", &config.health.bind_address, &mut errors);
    }
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.http.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodySize);
    }

    if HeaderName::from_bytes(config.identity.header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeader(config.identity.header.clone()));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::InvalidLogFormat(other.to_string())),
    }

    let buckets = &config.observability.buckets;
    if buckets.is_empty() {
        errors.push(ValidationError::EmptyBuckets);
    } else {
        let well_formed = buckets.iter().all(|b| b.is_finite() && *b > 0.0)
            && buckets.windows(2).all(|w| w[0] < w[1]);
        if !well_formed {
            errors.push(ValidationError::InvalidBuckets);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
