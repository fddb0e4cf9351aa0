//! skewer CLI - fuzz one endpoint and persist the report

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use skewer::{FuzzSession, FuzzerConfig};

/// Black-box API fuzzing and anomaly detection
#[derive(Parser, Debug)]
#[command(name = "skewer")]
#[command(author, version, about = "Black-box API fuzzing and anomaly detection", long_about = None)]
struct Cli {
    /// Base URL of the target API
    #[arg(env = "SKEWER_TARGET")]
    base_url: String,

    /// Endpoint path to fuzz
    #[arg(short, long, default_value = "/")]
    endpoint: String,

    /// HTTP method (GET, POST, PUT, DELETE, PATCH)
    #[arg(short, long, default_value = "POST")]
    method: String,

    /// Number of random payloads sent after the fixed corpus
    #[arg(short, long, default_value = "10")]
    random: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10", env = "SKEWER_TIMEOUT")]
    timeout: u64,

    /// Pause between requests in milliseconds
    #[arg(long, default_value = "100")]
    delay_ms: u64,

    /// Report output path
    #[arg(short, long, default_value = "fuzzing_results.json")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "SKEWER_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = FuzzerConfig {
        timeout_secs: cli.timeout,
        delay_ms: cli.delay_ms,
        ..FuzzerConfig::default()
    };

    let session = FuzzSession::new(&cli.base_url, config)?;
    session
        .fuzz_endpoint(&cli.endpoint, &cli.method, cli.random, None)
        .await;

    let report = session.export();
    report.summary.log();
    report.save(&cli.output)?;

    Ok(())
}
