//! # Valicache
//!
//! Drives a simulated exam-grading workload through the validation cache and prints
//! the resulting metrics.

mod bootstrap;
mod di;
mod workload;

use clap::Parser;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use valicache_domain::{CliOverrides, MetricsSnapshot};

use bootstrap::{init_logging, load_config};
use di::AppContainer;
use workload::WorkloadSummary;

#[derive(Parser)]
#[command(name = "valicache")]
#[command(version)]
#[command(about = "Memoized exam score validation with adaptive caching")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Maximum number of cached entries
    #[arg(long)]
    max_cache_size: Option<usize>,

    /// Entry time-to-live in milliseconds
    #[arg(long)]
    ttl_ms: Option<u64>,

    /// Maximum concurrent cache operations
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Scores submitted per university per round
    #[arg(short, long, default_value = "200")]
    students: usize,

    /// Number of grading rounds
    #[arg(short, long, default_value = "5")]
    rounds: usize,
}

#[derive(Serialize)]
struct Report {
    workload: WorkloadSummary,
    metrics: MetricsSnapshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        log_level: cli.log_level,
        ttl_ms: cli.ttl_ms,
        max_cache_size: cli.max_cache_size,
        max_concurrent_operations: cli.max_concurrency,
    };
    let config = load_config(cli.config.as_deref(), overrides)?;
    init_logging(&config);

    info!("Valicache starting");

    let container = AppContainer::new(&config)?;
    let shutdown = CancellationToken::new();
    let jobs = container.jobs(&config, shutdown.clone()).start().await;

    let summary =
        workload::run(container.validate_score.clone(), cli.students, cli.rounds).await;
    container.cache.run_maintenance().await;

    let report = Report {
        workload: summary,
        metrics: container.get_metrics.execute(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    jobs.shutdown().await;
    container.clear_cache.execute().await?;
    info!("Valicache stopped");
    Ok(())
}
