//! QuickLink demo
//!
//! Starts a shortener service, shortens and resolves a URL, then drives it
//! with a batch of concurrent workers and reports the store statistics.

use anyhow::Context;
use clap::Parser;
use quicklink::{ShortenerConfig, ShortenerError, ShortenerService};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Command-line configuration
#[derive(Debug, Parser)]
#[command(name = "quicklink", version, about = "Expiring in-memory URL shortener")]
struct Cli {
    /// URL to shorten and resolve
    #[arg(default_value = "https://www.example.com")]
    url: String,

    /// Prefix for rendered short URLs
    #[arg(long, env = "QUICKLINK_BASE_URL", default_value = quicklink::DEFAULT_BASE_URL)]
    base_url: String,

    /// Characters per alias
    #[arg(long, env = "QUICKLINK_KEY_LENGTH", default_value_t = 6)]
    key_length: usize,

    /// Mapping lifetime in milliseconds
    #[arg(long, env = "QUICKLINK_TTL_MS", default_value_t = 86_400_000)]
    ttl_ms: u64,

    /// Milliseconds between background sweeps
    #[arg(long, env = "QUICKLINK_SWEEP_INTERVAL_MS", default_value_t = 1_000)]
    sweep_interval_ms: u64,

    /// Number of concurrent workers to run against the service
    #[arg(long, env = "QUICKLINK_WORKERS", default_value_t = 8)]
    workers: usize,

    /// Wait for the TTL to pass and resolve again
    #[arg(long)]
    wait_expiry: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "QUICKLINK_LOG", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn shortener_config(&self) -> ShortenerConfig {
        ShortenerConfig {
            base_url: self.base_url.clone(),
            key_length: self.key_length,
            ttl: Duration::from_millis(self.ttl_ms),
            sweep_interval: Duration::from_millis(self.sweep_interval_ms),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("invalid log level")?;
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!(version = quicklink::VERSION, "Starting QuickLink");

    let config = cli.shortener_config();
    let service = Arc::new(ShortenerService::new(config).context("invalid configuration")?);
    service.start().context("failed to start expiry sweeper")?;

    let short_url = service.shorten(cli.url.as_str())?;
    println!("Shortened URL: {}", short_url);

    let resolved = service.resolve(&short_url)?;
    println!("Resolved URL: {}", resolved);

    run_workers(&service, cli.workers).await?;

    if cli.wait_expiry {
        let wait = service.config().ttl.saturating_add(service.config().sweep_interval);
        info!(wait_ms = wait.as_millis() as u64, "Waiting for mapping to expire");
        tokio::time::sleep(wait).await;

        match service.resolve(&short_url) {
            Err(ShortenerError::NotFound { alias }) => {
                println!("Resolved URL after expiry: not found ({})", alias)
            }
            other => warn!(result = ?other, "Mapping outlived its TTL"),
        }
    }

    let stats = service.store().stats();
    info!(
        mappings = stats.mappings,
        puts = stats.puts,
        gets = stats.gets,
        hits = stats.hits,
        misses = stats.misses,
        lazy_evicted = stats.lazy_evicted,
        swept = stats.swept,
        "Store statistics"
    );

    service.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Each worker shortens a distinct URL and resolves it back.
async fn run_workers(service: &Arc<ShortenerService>, workers: usize) -> anyhow::Result<()> {
    let mut tasks = JoinSet::new();

    for worker in 0..workers {
        let service = Arc::clone(service);
        tasks.spawn(async move {
            let target = format!("https://www.example.com/worker/{}", worker);
            let short_url = service.shorten(target.as_str())?;
            let resolved = service.resolve(&short_url)?;
            Ok::<bool, ShortenerError>(resolved == target)
        });
    }

    let mut matched = 0usize;
    while let Some(joined) = tasks.join_next().await {
        // A panicked or cancelled worker is a bug, not a miss
        if joined.context("worker task failed")?? {
            matched += 1;
        }
    }

    info!(workers, matched, "Concurrent workers finished");
    Ok(())
}
