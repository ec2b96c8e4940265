use lru::LruCache;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::key::CacheKey;

#[derive(Debug, Clone, Copy)]
pub struct EntryMeta {
    pub created_at: Instant,
    pub last_accessed_at: Instant,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Live,
    Expired,
    Unknown,
}

/// Keys dropped from the index by one cleanup pass; the caller removes them from storage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub expired: Vec<CacheKey>,
    pub evicted: Vec<CacheKey>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.evicted.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.expired.iter().chain(self.evicted.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityDecision {
    /// Room exists for the new key; `report` lists anything evicted to make it.
    Ready { report: CleanupReport },
    /// Cleanup could not free a slot; the index was emptied and storage must be flushed.
    ClearAll { removed: usize },
}

struct EvictionState {
    index: LruCache<CacheKey, EntryMeta, FxBuildHasher>,
    last_cleanup: Instant,
}

/// Recency index plus TTL and capacity policy.
///
/// TTL runs from `created_at`; reads only refresh recency. The index holds exactly
/// the keys whose payload was successfully written to storage.
pub struct EvictionManager {
    state: Mutex<EvictionState>,
    ttl: Duration,
    base_max_entries: usize,
    max_entries: AtomicUsize,
    watermark: f64,
    cleanup_interval: Duration,
}

impl EvictionManager {
    pub fn new(
        ttl: Duration,
        max_entries: usize,
        watermark: f64,
        cleanup_interval: Duration,
    ) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            state: Mutex::new(EvictionState {
                index: LruCache::unbounded_with_hasher(FxBuildHasher),
                last_cleanup: Instant::now(),
            }),
            ttl,
            base_max_entries: max_entries,
            max_entries: AtomicUsize::new(max_entries),
            watermark,
            cleanup_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EvictionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries.load(Ordering::Relaxed)
    }

    /// Rescale capacity relative to the configured maximum; never below one entry.
    pub fn set_scale(&self, factor: f64) {
        let scaled = ((self.base_max_entries as f64) * factor).round() as usize;
        self.max_entries.store(scaled.max(1), Ordering::Relaxed);
    }

    fn watermark_len(&self) -> usize {
        ((self.max_entries() as f64) * self.watermark).floor() as usize
    }

    fn is_expired(&self, meta: &EntryMeta, now: Instant) -> bool {
        now.saturating_duration_since(meta.created_at) >= self.ttl
    }

    /// Index a freshly written entry; re-recording a key restarts its TTL.
    pub fn record(&self, key: CacheKey, size: usize, now: Instant) {
        self.lock().index.put(
            key,
            EntryMeta {
                created_at: now,
                last_accessed_at: now,
                size,
            },
        );
    }

    /// Mark a read. Returns `false` if the key is not indexed.
    pub fn touch(&self, key: &CacheKey, now: Instant) -> bool {
        match self.lock().index.get_mut(key) {
            Some(meta) => {
                meta.last_accessed_at = now;
                true
            }
            None => false,
        }
    }

    pub fn status(&self, key: &CacheKey, now: Instant) -> EntryStatus {
        match self.lock().index.peek(key) {
            Some(meta) if self.is_expired(meta, now) => EntryStatus::Expired,
            Some(_) => EntryStatus::Live,
            None => EntryStatus::Unknown,
        }
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        self.lock().index.pop(key).is_some()
    }

    pub fn should_cleanup(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.lock().last_cleanup) >= self.cleanup_interval
    }

    /// Drop expired entries oldest first, then least recently used entries until the
    /// index is at or below the watermark.
    pub fn cleanup(&self, now: Instant) -> CleanupReport {
        let mut state = self.lock();
        let report = self.cleanup_locked(&mut state, now);
        if !report.is_empty() {
            debug!(
                expired = report.expired.len(),
                evicted = report.evicted.len(),
                remaining = state.index.len(),
                "Eviction cleanup"
            );
        }
        report
    }

    fn cleanup_locked(&self, state: &mut EvictionState, now: Instant) -> CleanupReport {
        state.last_cleanup = now;

        let mut stale: Vec<(Instant, CacheKey)> = state
            .index
            .iter()
            .filter(|(_, meta)| self.is_expired(meta, now))
            .map(|(key, meta)| (meta.created_at, key.clone()))
            .collect();
        stale.sort_by_key(|(created_at, _)| *created_at);

        let mut report = CleanupReport::default();
        for (_, key) in stale {
            state.index.pop(&key);
            report.expired.push(key);
        }

        let watermark = self.watermark_len();
        while state.index.len() > watermark {
            match state.index.pop_lru() {
                Some((key, _)) => report.evicted.push(key),
                None => break,
            }
        }
        report
    }

    /// Make room for `key` before it is written.
    ///
    /// A no-op for an indexed key or when below capacity. Otherwise forces a cleanup,
    /// and if that still leaves no room, empties the index.
    pub fn ensure_capacity(&self, key: &CacheKey, now: Instant) -> CapacityDecision {
        let mut state = self.lock();
        let max = self.max_entries();
        if state.index.contains(key) || state.index.len() < max {
            return CapacityDecision::Ready {
                report: CleanupReport::default(),
            };
        }

        let report = self.cleanup_locked(&mut state, now);
        if state.index.len() < max {
            return CapacityDecision::Ready { report };
        }

        let removed = state.index.len() + report.expired.len() + report.evicted.len();
        state.index.clear();
        CapacityDecision::ClearAll { removed }
    }

    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let removed = state.index.len();
        state.index.clear();
        removed
    }
}
