use std::sync::Arc;
use valicache_domain::MetricsSnapshot;

use crate::ports::ValidationCachePort;

pub struct GetCacheMetricsUseCase {
    cache: Arc<dyn ValidationCachePort>,
}

impl GetCacheMetricsUseCase {
    pub fn new(cache: Arc<dyn ValidationCachePort>) -> Self {
        Self { cache }
    }

    pub fn execute(&self) -> MetricsSnapshot {
        self.cache.metrics()
    }
}
