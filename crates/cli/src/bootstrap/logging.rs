use tracing::{info, Level};
use valicache_domain::Config;

/// Configured level, falling back to `INFO` for anything unrecognized.
fn max_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

pub fn init_logging(config: &Config) {
    let level = max_level(&config.logging.level);

    // stdout carries the metrics report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_max_level(level)
        .with_ansi(true)
        .init();

    info!(
        level = %level,
        compression = config.cache.compression.enabled,
        adaptive_scaling = config.cache.scaling.enabled,
        "Logging initialized"
    );
}
