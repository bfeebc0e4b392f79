//! Versioned API gateway (v1)
//!
//! Front door for a version-prefixed HTTP API. Every request is classified
//! (CORS preflight, caller identity, API version, method path, request kind)
//! before it reaches the downstream query dispatcher.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ RequestClassifier ──▶ QueryDispatcher
//!                     (request id,    │ CORS short-circuit
//!                      trace,         │ identity (401)
//!                      timeout)       │ version / sub path (400)
//!                                     │ kind (ORDINARY / COORDINATE)
//!                                     ▼
//!     Client Response ◀──────── plain-text body or error envelope
//!
//!     Cross-cutting: config · observability (logs, Prometheus) ·
//!                    health (readiness probes) · lifecycle (startup/shutdown)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use query_gateway::config::{load_config, validation::validate_config, ServiceConfig};
use query_gateway::dispatch::EchoDispatcher;
use query_gateway::lifecycle;
use query_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "query-gateway")]
#[command(about = "Front-door request classifier for a versioned HTTP API", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        if let Err(errors) = validate_config(&config) {
            return Err(query_gateway::config::ConfigError::Validation(errors).into());
        }
    }

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init(&config.observability)?;

    tracing::info!("query-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mount = %config.http.mount_prefix(),
        cors = config.http.cors,
        request_timeout_secs = config.http.request_timeout_secs,
        "Configuration loaded"
    );

    lifecycle::run(config, Arc::new(EchoDispatcher::new())).await?;
    Ok(())
}
