#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use valicache_application::ports::StorageBackend;
use valicache_domain::CacheError;
use valicache_infrastructure::InMemoryBackend;

/// In-memory backend that counts every call and can be told to fail.
#[derive(Clone, Default)]
pub struct CountingBackend {
    inner: Arc<InMemoryBackend>,
    gets: Arc<AtomicUsize>,
    sets: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
    flushes: Arc<AtomicUsize>,
    failing_gets: Arc<AtomicU32>,
    failing_sets: Arc<AtomicU32>,
    down: Arc<AtomicBool>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails until [`recover`](Self::recover).
    pub fn go_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.down.store(false, Ordering::SeqCst);
    }

    pub fn fail_next_gets(&self, n: u32) {
        self.failing_gets.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_sets(&self, n: u32) {
        self.failing_sets.store(n, Ordering::SeqCst);
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.gets() + self.sets() + self.deletes() + self.flushes()
    }

    /// Values physically held, expired or not.
    pub fn stored(&self) -> usize {
        self.inner.len()
    }

    fn should_fail(&self, budget: &AtomicU32) -> bool {
        if self.down.load(Ordering::SeqCst) {
            return true;
        }
        budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl StorageBackend for CountingBackend {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(&self.failing_gets) {
            return Err(CacheError::backend("get", key, "connection reset"));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.should_fail(&self.failing_sets) {
            return Err(CacheError::backend("set", key, "connection reset"));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(CacheError::backend("delete", key, "connection reset"));
        }
        self.inner.delete(key).await
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(CacheError::backend("flush_all", "*", "connection reset"));
        }
        self.inner.flush_all().await
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}
