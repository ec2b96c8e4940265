use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use valicache_application::ports::StorageBackend;
use valicache_domain::CacheError;

struct StoredValue {
    bytes: Bytes,
    expires_at: Instant,
}

impl StoredValue {
    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local backend over a sharded `DashMap`.
///
/// Each value carries its own expiry; expired values are dropped lazily on read.
pub struct InMemoryBackend {
    entries: DashMap<Arc<str>, StoredValue, FxBuildHasher>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    /// Values currently held, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired value; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, value| !value.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.bytes.clone()));
            }
            // Drop the shard guard before removing
            drop(entry);
            self.entries.remove_if(key, |_, value| value.is_expired(now));
            debug!(key = %key, "Dropped expired value (lazy)");
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(
            Arc::from(key),
            StoredValue {
                bytes: value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// Backend that never stores anything; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBackend;

#[async_trait]
impl StorageBackend for NoopBackend {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
