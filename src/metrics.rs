use anyhow::{Context, Result};
use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// Install the Prometheus exporter with an HTTP listener on the given port.
/// Must be called from within the tokio runtime.
pub fn install_exporter(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("Failed to install Prometheus metrics exporter")?;
    info!("Metrics available at http://{}/metrics", addr);
    Ok(())
}

/// Zero-initialize the pipeline's metrics so they appear in the first scrape,
/// before any events occur. Call after the exporter is installed.
pub fn initialize_collector_metrics() {
    counter!("sbs.bytes_received_total").absolute(0);
    counter!("sbs.decode.accepted_total").absolute(0);
    counter!("sbs.decode.rejected_total").absolute(0);
    counter!("sbs.forward.batches_total").absolute(0);
    counter!("sbs.forward.messages_total").absolute(0);
    counter!("sbs.forward.delivery_failed_total").absolute(0);
    gauge!("sbs.message_rate").set(0.0);
}
