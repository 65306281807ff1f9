use anyhow::{Result, bail};
use clap::Parser;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://app.scalyr.com/api/addEvents";

/// Command-line arguments, each overridable by its environment variable
#[derive(Debug, Parser)]
#[command(
    name = "adsb-collector",
    version,
    about = "Collects SBS-1 BaseStation messages from a dump1090 receiver and forwards them in batches to a DataSet ingestion endpoint"
)]
pub struct Args {
    /// Write token for the ingestion endpoint
    #[arg(long, env = "DATASET_API_WRITE_TOKEN", hide_env_values = true)]
    pub dataset_api_write_token: Option<String>,

    /// Hostname of the dump1090 receiver
    #[arg(long, env = "DUMP1090_HOST")]
    pub dump1090_host: Option<String>,

    /// SBS (BaseStation) output port of the dump1090 receiver
    #[arg(long, env = "DUMP1090_PORT", default_value_t = 30003)]
    pub dump1090_port: u16,

    /// Number of messages to accumulate before each delivery
    #[arg(long, env = "BATCH_SIZE", default_value_t = 500)]
    pub batch_size: usize,

    /// Source label attached to each forwarded event
    #[arg(long, env = "COLLECTOR_SOURCE", default_value = "dump1090")]
    pub collector_source: String,

    /// Ingestion endpoint URL
    #[arg(long, env = "DATASET_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Upper bound on each outbound delivery, in seconds
    #[arg(long, env = "DELIVERY_TIMEOUT_SECONDS", default_value_t = 30)]
    pub delivery_timeout_seconds: u64,

    /// Port for the Prometheus metrics exporter (disabled when unset)
    #[arg(long, env = "METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Validated, immutable configuration for one collector run.
/// Constructed once at startup and passed explicitly into the pipeline.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub write_token: String,
    pub host: String,
    pub port: u16,
    pub batch_size: usize,
    pub source: String,
    pub endpoint: String,
    pub delivery_timeout: Duration,
    pub metrics_port: Option<u16>,
}

impl CollectorConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        let write_token = match args.dataset_api_write_token {
            Some(token) if !token.is_empty() => token,
            _ => bail!(
                "dataset_api_write_token is not set. Provide --dataset-api-write-token or set the DATASET_API_WRITE_TOKEN environment variable"
            ),
        };

        let host = match args.dump1090_host {
            Some(host) if !host.is_empty() => host,
            _ => bail!(
                "dump1090_host is not set. Provide --dump1090-host or set the DUMP1090_HOST environment variable"
            ),
        };

        if args.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }

        Ok(Self {
            write_token,
            host,
            port: args.dump1090_port,
            batch_size: args.batch_size,
            source: args.collector_source,
            endpoint: args.endpoint,
            delivery_timeout: Duration::from_secs(args.delivery_timeout_seconds),
            metrics_port: args.metrics_port,
        })
    }
}
