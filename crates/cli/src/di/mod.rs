use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use valicache_application::ports::{CacheMaintenancePort, ScoreValidator, StorageBackend};
use valicache_application::use_cases::{
    ClearCacheUseCase, GetCacheMetricsUseCase, ValidateScoreUseCase,
};
use valicache_domain::Config;
use valicache_infrastructure::{InMemoryBackend, RangeValidator, ValidationCache};
use valicache_jobs::{AdaptiveScalingJob, CacheMaintenanceJob, JobRunner};

/// Wires the cache, its collaborators and the use cases built on top.
pub struct AppContainer {
    pub cache: Arc<ValidationCache>,
    pub validate_score: Arc<ValidateScoreUseCase>,
    pub get_metrics: Arc<GetCacheMetricsUseCase>,
    pub clear_cache: Arc<ClearCacheUseCase>,
}

impl AppContainer {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());
        let validator: Arc<dyn ScoreValidator> = Arc::new(RangeValidator::new());

        let cache = Arc::new(ValidationCache::new(
            config.cache.clone(),
            backend,
            validator.clone(),
        )?);

        Ok(Self {
            validate_score: Arc::new(ValidateScoreUseCase::new(cache.clone(), validator)),
            get_metrics: Arc::new(GetCacheMetricsUseCase::new(cache.clone())),
            clear_cache: Arc::new(ClearCacheUseCase::new(cache.clone())),
            cache,
        })
    }

    /// Background jobs for this cache, bound to `shutdown`.
    pub fn jobs(&self, config: &Config, shutdown: CancellationToken) -> JobRunner {
        let port: Arc<dyn CacheMaintenancePort> = self.cache.clone();
        let runner = JobRunner::new(shutdown).with_maintenance(
            CacheMaintenanceJob::new(port.clone())
                .with_interval(config.cache.monitoring.sample_interval_ms),
        );

        if config.cache.scaling.enabled {
            runner.with_scaling(
                AdaptiveScalingJob::new(port)
                    .with_interval(config.cache.scaling.check_interval_ms),
            )
        } else {
            runner
        }
    }
}
