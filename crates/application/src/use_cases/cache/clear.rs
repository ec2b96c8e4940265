use std::sync::Arc;
use tracing::{info, instrument};
use valicache_domain::CacheError;

use crate::ports::ValidationCachePort;

pub struct ClearCacheUseCase {
    cache: Arc<dyn ValidationCachePort>,
}

impl ClearCacheUseCase {
    pub fn new(cache: Arc<dyn ValidationCachePort>) -> Self {
        Self { cache }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<(), CacheError> {
        self.cache.clear().await?;
        info!("Validation cache cleared");
        Ok(())
    }
}
