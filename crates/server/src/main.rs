//! roam-sw entry point.
//!
//! Boots the offline worker against the configured cache store, then serves
//! it as MCP tools on stdio. Logging goes to stderr to avoid interfering with
//! the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use roam_client::{FetchClient, FetchConfig, Worker};
use roam_core::{CacheStore, WorkerConfig};
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = WorkerConfig::load().context("loading configuration")?;
    let store = CacheStore::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache store at {}", config.db_path.display()))?;
    let network = FetchClient::new(FetchConfig::from(&config))?;

    let worker = Arc::new(Worker::new(config, store, Arc::new(network))?);
    let installed = worker.install().await?;
    let activated = worker.activate().await?;
    tracing::info!(
        precached = installed.precached,
        deleted = activated.deleted.len(),
        "worker {} on stdio transport",
        worker.state().await
    );

    let handler = handler::RoamWorkerServer::new(Arc::clone(&worker));
    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    worker.retire().await;
    Ok(())
}
