//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Bind listeners and begin accepting traffic
//! - Signal readiness once traffic can be served
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Metrics exporter failure is logged, not fatal
//! - Readiness flips only after the API listener is bound
//! - An API server that exits on its own triggers shutdown like a signal does

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::ServiceConfig;
use crate::dispatch::QueryDispatcher;
use crate::health::{probe_router, Readiness, ReadinessSignal};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics::init_exporter;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Server(#[from] ServerError),
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Run the service until a termination signal arrives.
pub async fn run(
    config: ServiceConfig,
    dispatcher: Arc<dyn QueryDispatcher>,
) -> Result<(), StartupError> {
    let readiness = Arc::new(Readiness::new());
    let shutdown = Shutdown::new(readiness.clone());

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = init_exporter(addr, &config.observability.buckets) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    if config.health.enabled {
        let listener = bind(&config.health.bind_address).await?;
        tracing::info!(address = %config.health.bind_address, "Probe server listening");

        let app = probe_router(readiness.clone());
        let mut stop = shutdown.subscribe();
        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop.recv().await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "Probe server failed");
            }
        });
    }

    let listener = bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, dispatcher)?;
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    readiness.ready();

    supervise(server_task, &shutdown, signals::wait_for_termination()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for `terminate` or for the server task to end, whichever comes
/// first, then trigger shutdown and collect the server's result.
async fn supervise<F>(
    mut server_task: JoinHandle<Result<(), ServerError>>,
    shutdown: &Shutdown,
    terminate: F,
) -> Result<(), StartupError>
where
    F: Future<Output = ()>,
{
    let joined = tokio::select! {
        _ = terminate => None,
        joined = &mut server_task => {
            tracing::error!("HTTP server exited before shutdown was requested");
            Some(joined)
        }
    };

    shutdown.trigger();

    let joined = match joined {
        Some(joined) => joined,
        None => server_task.await,
    };
    match joined {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "HTTP server task panicked"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shutdown() -> (Arc<Readiness>, Shutdown) {
        let readiness = Arc::new(Readiness::new());
        readiness.ready();
        (readiness.clone(), Shutdown::new(readiness))
    }

    #[tokio::test]
    async fn test_server_exit_triggers_shutdown() {
        let (readiness, shutdown) = shutdown();
        let mut probe_stop = shutdown.subscribe();
        let server_task = tokio::spawn(async {
            Err(ServerError::Io(std::io::Error::other("accept failed")))
        });

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            supervise(server_task, &shutdown, std::future::pending()),
        )
        .await
        .expect("supervise must not wait for a signal");

        assert!(matches!(result, Err(StartupError::Server(ServerError::Io(_)))));
        assert!(!readiness.is_ready());
        assert!(probe_stop.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_server_panic_is_logged_not_propagated() {
        let (readiness, shutdown) = shutdown();
        let server_task: JoinHandle<Result<(), ServerError>> =
            tokio::spawn(async { panic!("listener gone") });

        let result = supervise(server_task, &shutdown, std::future::pending()).await;

        assert!(result.is_ok());
        assert!(!readiness.is_ready());
    }

    #[tokio::test]
    async fn test_termination_drains_server() {
        let (readiness, shutdown) = shutdown();
        let mut stop = shutdown.subscribe();
        let server_task = tokio::spawn(async move {
            let _ = stop.recv().await;
            Ok(())
        });

        let result = supervise(server_task, &shutdown, async {}).await;

        assert!(result.is_ok());
        assert!(!readiness.is_ready());
    }
}
