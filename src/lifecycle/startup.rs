//! Startup orchestration.
//!
//! # Responsibilities
//! - Install the metrics exporter when enabled
//! - Build the redirect handler chain
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: a bad redirect file or bind error stops startup
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::{ConfigError, ServerConfig, ValidationError};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("Server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A server accepting connections in the background.
#[derive(Debug)]
pub struct Running {
    local_addr: SocketAddr,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Running {
    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the server to stop.
    pub async fn wait(self) -> Result<(), StartupError> {
        self.handle.await??;
        Ok(())
    }
}

/// Start serving `config` until `shutdown` triggers.
pub async fn start(config: ServerConfig, shutdown: &Shutdown) -> Result<Running, StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse().map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidMetricsAddress(
                config.observability.metrics_address.clone(),
            )])
        })?;
        metrics::init_metrics(addr)?;
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::from_config(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    Ok(Running { local_addr, handle })
}
