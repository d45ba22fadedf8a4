//! hubd: hub daemon.
//!
//! Starts the session directory worker and keeps it running until ctrl-c.
//! Connection and command handlers attach through the `HubHandle`.

use std::sync::Arc;

use anyhow::{Context, Result};

use hub_core::HubConfig;
use hub_services::{Hub, HubWorker, NetStats};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = HubConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = HubConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        HubConfig::default()
    });
    tracing::info!(path = %HubConfig::file_path().display(), "hubd starting");

    let net_stats = Arc::new(NetStats::new());
    let hub = Hub::init(config, net_stats.clone()).context("hub startup failed")?;

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Hub worker ───────────────────────────────────────────────────────────
    let (handle, worker) = HubWorker::new(hub, shutdown_tx.subscribe());
    let worker_task = tokio::spawn(worker.run());

    // Held for the connection layer; dropping the last handle stops the worker.
    let _handle = handle;

    worker_task.await.context("hub worker panicked")?;
    tracing::info!("hubd stopped");
    Ok(())
}
