//! nel-collector - a collector daemon for Network Error Logging reports
//!
//! # Usage
//!
//! ```bash
//! # Run with the default chain (filter to NEL, dump CLF lines to stdout)
//! nel-collector
//!
//! # Run with an operator-defined processor chain
//! nel-collector --config collector.toml
//!
//! # Reload the configuration without dropping in-flight uploads
//! kill -HUP $(pidof nel-collector)
//! ```

mod serve;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Collector for Network Error Logging report uploads
#[derive(Parser, Debug, Clone)]
#[command(name = "nel-collector")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML file declaring the processor chain
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Address and port to listen on
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Capacity of the batch queue
    #[arg(long, default_value_t = nel_pipeline::DEFAULT_QUEUE_SIZE)]
    queue_size: usize,

    /// Number of worker tasks draining the queue
    #[arg(long, default_value_t = nel_pipeline::DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Keep non-NEL reports in the default chain (ignored with --config)
    #[arg(long)]
    keep_non_nel_reports: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    serve::run(cli).await
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();

    Ok(())
}
