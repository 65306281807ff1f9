use anyhow::Result;
use tracing::info;

use crate::config::CollectorConfig;
use crate::dataset::DatasetSink;
use crate::forwarder::BatchForwarder;
use crate::sbs::{SbsClient, SbsClientConfig};

/// Assemble and run the decode-batch-forward pipeline.
pub async fn handle_collect(config: CollectorConfig) -> Result<()> {
    info!(
        "Starting collector - feed: {}:{}, endpoint: {}, batch size: {}",
        config.host, config.port, config.endpoint, config.batch_size
    );

    if let Some(port) = config.metrics_port {
        crate::metrics::install_exporter(port)?;
        crate::metrics::initialize_collector_metrics();
    }

    let sink = DatasetSink::new(&config.endpoint, &config.write_token, config.delivery_timeout)?;
    let mut forwarder = BatchForwarder::new(sink, &config.source, config.batch_size);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    // Signal handler task for SIGINT and SIGTERM
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down...");
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT (Ctrl+C), shutting down...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, shutting down...");
                }
                Err(err) => {
                    tracing::error!("Failed to listen for Ctrl+C: {}", err);
                    return;
                }
            }
        }

        let _ = shutdown_tx.send(());
    });

    let client = SbsClient::new(SbsClientConfig {
        host: config.host.clone(),
        port: config.port,
    });

    client.run(&mut forwarder, shutdown_rx).await?;

    info!("Collector stopped");
    Ok(())
}
