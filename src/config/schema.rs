//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service identity (used as the metrics `service` label).
    pub service: ServiceSection,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// API mount, CORS and request limits.
    pub http: HttpConfig,

    /// Caller identity resolution.
    pub identity: IdentityConfig,

    /// Readiness/liveness probe server.
    pub health: HealthConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSection {
    /// Service name.
    pub name: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: "query-gateway".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// HTTP surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Mount prefix preceding the version segment (e.g. "api" for `/api/v1/...`).
    /// Leading and trailing slashes are ignored.
    pub endpoint: String,

    /// Answer `OPTIONS` preflight requests with CORS headers.
    pub cors: bool,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum buffered request body size in bytes.
    pub max_body_size: usize,
}

impl HttpConfig {
    /// Mount prefix in path form: `/api` for `endpoint = "api"`, empty for root.
    pub fn mount_prefix(&self) -> String {
        let trimmed = self.endpoint.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            endpoint: "api".to_string(),
            cors: false,
            request_timeout_secs: 30,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Identity resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Header carrying the caller ID.
    pub header: String,

    /// Reject anonymous callers.
    pub required: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            header: "x-user-id".to_string(),
            required: false,
        }
    }
}

/// Probe server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Serve `/live` and `/ready`.
    pub enabled: bool,

    /// Probe server bind address.
    pub bind_address: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Histogram buckets for request durations, in seconds.
    pub buckets: Vec<f64>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
            buckets: vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_prefix_normalization() {
        let mut http = HttpConfig::default();
        assert_eq!(http.mount_prefix(), "/api");

        http.endpoint = "/api/".to_string();
        assert_eq!(http.mount_prefix(), "/api");

        http.endpoint = "query/db".to_string();
        assert_eq!(http.mount_prefix(), "/query/db");

        http.endpoint = "/".to_string();
        assert_eq!(http.mount_prefix(), "");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [http]
            cors = true
            "#,
        )
        .unwrap();

        assert!(config.http.cors);
        assert_eq!(config.http.endpoint, "api");
        assert_eq!(config.identity.header, "x-user-id");
        assert_eq!(config.observability.buckets.len(), 11);
    }
}
