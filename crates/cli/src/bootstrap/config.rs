use tracing::info;
use valicache_domain::{CliOverrides, Config};

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    let cache = &config.cache;
    info!(
        config_file = config_path.unwrap_or("default"),
        ttl_ms = cache.ttl_ms,
        max_cache_size = cache.max_cache_size,
        max_concurrent_operations = cache.max_concurrent_operations,
        operation_timeout_ms = cache.operation_timeout_ms,
        max_retry_attempts = cache.retry.max_retry_attempts,
        compression = cache.compression.enabled,
        compression_threshold_bytes = cache.compression.threshold_bytes,
        adaptive_scaling = cache.scaling.enabled,
        "Configuration loaded"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_reach_cache_config() {
        let overrides = CliOverrides {
            ttl_ms: Some(1_500),
            max_cache_size: Some(64),
            max_concurrent_operations: Some(2),
            ..Default::default()
        };

        let config = load_config(None, overrides).unwrap();

        assert_eq!(config.cache.ttl_ms, 1_500);
        assert_eq!(config.cache.max_cache_size, 64);
        assert_eq!(config.cache.max_concurrent_operations, 2);
        assert!(config.cache.compression.enabled);
        assert!(!config.cache.scaling.enabled);
    }

    #[test]
    fn test_out_of_range_override_fails_fast() {
        let overrides = CliOverrides {
            max_cache_size: Some(0),
            ..Default::default()
        };

        assert!(load_config(None, overrides).is_err());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let result = load_config(Some("/nonexistent/valicache.toml"), CliOverrides::default());
        assert!(result.is_err());
    }
}
