use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use valicache_domain::CacheError;

/// Key/value store the validation cache persists framed payloads into.
///
/// Implementations may drop values at any time (a no-op store is valid); the cache
/// never assumes a value it wrote is still there.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    /// Returns whether a value was present.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn flush_all(&self) -> Result<(), CacheError>;

    fn name(&self) -> &'static str {
        "custom"
    }
}
