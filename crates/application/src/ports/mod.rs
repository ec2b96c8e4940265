pub mod cache_maintenance;
pub mod score_validator;
pub mod storage_backend;
pub mod validation_cache;

pub use cache_maintenance::CacheMaintenancePort;
pub use score_validator::ScoreValidator;
pub use storage_backend::StorageBackend;
pub use validation_cache::ValidationCachePort;
