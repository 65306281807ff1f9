use anyhow::{Context, Result};
use metrics::{counter, gauge};
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::forwarder::{BatchForwarder, EventSink};
use crate::sbs::decoder::{self, DecodeOutcome};

const STATS_INTERVAL_SECONDS: u64 = 10;

/// Configuration for the SBS client
#[derive(Debug, Clone)]
pub struct SbsClientConfig {
    /// dump1090 hostname
    pub host: String,
    /// SBS (BaseStation) output port, typically 30003
    pub port: u16,
}

/// Client that connects to an SBS-1 BaseStation feed over TCP and drives the
/// decode-batch-forward pipeline.
///
/// One long-lived connection per run: connect and read failures are fatal to
/// the run, after the forwarder's partial batch has been flushed.
pub struct SbsClient {
    config: SbsClientConfig,
}

impl SbsClient {
    pub fn new(config: SbsClientConfig) -> Self {
        Self { config }
    }

    /// Run until the feed closes, a read error occurs, or shutdown is
    /// signalled. The partial batch is flushed on every exit path.
    pub async fn run<S: EventSink>(
        &self,
        forwarder: &mut BatchForwarder<S>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> Result<()> {
        let address = format!("{}:{}", self.config.host, self.config.port);
        info!("Connecting to SBS feed at {}", address);

        let stream = TcpStream::connect(&address)
            .await
            .with_context(|| format!("Failed to connect to SBS feed at {address}"))?;
        info!("Connected to SBS feed at {}", address);

        let reader = BufReader::new(stream);
        let result = tokio::select! {
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, closing SBS connection");
                Ok(())
            }
            result = pump_lines(reader, forwarder) => result,
        };

        forwarder.flush().await;
        result
    }
}

/// Read newline-delimited SBS records, decode each line, and offer accepted
/// records to the forwarder. Returns when the stream ends; a read error
/// propagates as fatal.
pub(crate) async fn pump_lines<R, S>(reader: R, forwarder: &mut BatchForwarder<S>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    S: EventSink,
{
    let mut lines = reader.lines();
    let mut accepted = 0u64;
    let mut skipped = 0u64;
    let mut last_stats = Instant::now();

    while let Some(line) = lines
        .next_line()
        .await
        .context("SBS feed read error")?
    {
        counter!("sbs.bytes_received_total").increment(line.len() as u64);

        if line.trim().is_empty() {
            continue;
        }

        match decoder::decode(&line) {
            DecodeOutcome::Accepted(message) => {
                counter!("sbs.decode.accepted_total").increment(1);
                accepted += 1;
                forwarder.offer(*message).await;
            }
            DecodeOutcome::Rejected(reason) => {
                counter!("sbs.decode.rejected_total").increment(1);
                skipped += 1;
                debug!("Skipping SBS line ({}): {}", reason, line);
            }
        }

        if last_stats.elapsed().as_secs() >= STATS_INTERVAL_SECONDS {
            let rate = accepted as f64 / last_stats.elapsed().as_secs_f64();
            info!(
                "SBS stats: {:.1} msg/s, {} accepted, {} skipped, {} buffered",
                rate,
                accepted,
                skipped,
                forwarder.buffered()
            );
            gauge!("sbs.message_rate").set(rate);
            accepted = 0;
            skipped = 0;
            last_stats = Instant::now();
        }
    }

    info!("SBS feed closed by server");
    Ok(())
}
