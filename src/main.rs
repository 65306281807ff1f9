use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use adsb_collector::commands;
use adsb_collector::config::{Args, CollectorConfig};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match CollectorConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = commands::handle_collect(config).await {
        error!("Collector failed: {:#}", e);
        std::process::exit(1);
    }
}
