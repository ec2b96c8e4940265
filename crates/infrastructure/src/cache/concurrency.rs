use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore, SemaphorePermit};
use tracing::debug;
use valicache_domain::CacheError;

use super::key::CacheKey;
use super::metrics::MetricsCollector;

type Outcome<T> = Result<T, CacheError>;

struct InflightRequest<T> {
    id: u64,
    sender: broadcast::Sender<Outcome<T>>,
}

enum Role<'a, T: Clone + Send + 'static> {
    Leader(FlightGuard<'a, T>),
    Follower(broadcast::Receiver<Outcome<T>>),
}

/// Owns a key's in-flight slot. Deregisters the key on every exit path.
struct FlightGuard<'a, T: Clone + Send + 'static> {
    inflight: &'a DashMap<CacheKey, Arc<InflightRequest<T>>, FxBuildHasher>,
    key: CacheKey,
    id: u64,
    sender: broadcast::Sender<Outcome<T>>,
    done: bool,
}

impl<T: Clone + Send + 'static> FlightGuard<'_, T> {
    /// Deregister first, then publish: anyone who subscribed got in before the removal.
    fn complete(mut self, outcome: Outcome<T>) {
        self.deregister();
        self.done = true;
        // No receivers is fine
        let _ = self.sender.send(outcome);
    }

    fn deregister(&self) {
        let id = self.id;
        self.inflight.remove_if(&self.key, |_, request| request.id == id);
    }
}

impl<T: Clone + Send + 'static> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        if !self.done {
            // Leader cancelled or panicked; followers see the channel close and retry
            self.deregister();
        }
    }
}

/// Holds one global slot; retires it instead of returning it while the limit is being lowered.
struct SlotGuard<'a> {
    permit: Option<SemaphorePermit<'a>>,
    active: &'a AtomicUsize,
    retire_debt: &'a AtomicUsize,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        let retired = self
            .retire_debt
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |debt| debt.checked_sub(1))
            .is_ok();
        if let Some(permit) = self.permit.take() {
            if retired {
                permit.forget();
            }
        }
    }
}

/// Global concurrency bound plus per-key single-flight.
///
/// At most `max_concurrency` operations hold a slot at once; waiters are served FIFO.
/// For any key at most one operation is in flight, and callers that join it receive
/// a clone of its outcome.
pub struct ConcurrencyController<T: Clone + Send + 'static> {
    semaphore: Semaphore,
    limit: AtomicUsize,
    retire_debt: AtomicUsize,
    active: AtomicUsize,
    inflight: DashMap<CacheKey, Arc<InflightRequest<T>>, FxBuildHasher>,
    next_id: AtomicU64,
    timeout: Duration,
    metrics: Arc<MetricsCollector>,
}

impl<T: Clone + Send + 'static> ConcurrencyController<T> {
    pub fn new(max_concurrency: usize, timeout: Duration, metrics: Arc<MetricsCollector>) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            semaphore: Semaphore::new(max_concurrency),
            limit: AtomicUsize::new(max_concurrency),
            retire_debt: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            inflight: DashMap::with_hasher(FxBuildHasher),
            next_id: AtomicU64::new(1),
            timeout,
            metrics,
        }
    }

    /// Run `operation` as the single flight for `key`, or join the flight already running.
    pub async fn run_exclusive<F, Fut>(&self, key: &CacheKey, operation: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        self.run(key, operation, true).await
    }

    /// Like [`run_exclusive`](Self::run_exclusive) but never adopts another flight's
    /// outcome: waits for it to finish, then runs `operation` as the next flight.
    /// Callers joining this flight receive `operation`'s outcome.
    pub async fn run_serialized<F, Fut>(&self, key: &CacheKey, operation: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        self.run(key, operation, false).await
    }

    async fn run<F, Fut>(&self, key: &CacheKey, operation: F, adopt: bool) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let mut operation = Some(operation);
        loop {
            match self.join(key) {
                Role::Leader(guard) => {
                    let Some(operation) = operation.take() else {
                        return Err(CacheError::Abandoned(format!("flight for {key} lost its operation")));
                    };
                    let outcome = self.run_bounded(operation).await;
                    guard.complete(outcome.clone());
                    return outcome;
                }
                Role::Follower(mut receiver) => match receiver.recv().await {
                    Ok(outcome) if adopt => {
                        self.metrics.record_coalesced();
                        debug!(key = %key, "Joined in-flight operation");
                        return outcome;
                    }
                    Ok(_) => continue,
                    Err(_) => {
                        debug!(key = %key, "In-flight leader went away, retrying");
                        continue;
                    }
                },
            }
        }
    }

    fn join(&self, key: &CacheKey) -> Role<'_, T> {
        if let Some(existing) = self.inflight.get(key) {
            return Role::Follower(existing.sender.subscribe());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, _) = broadcast::channel(1);
        match self.inflight.entry(key.clone()) {
            Entry::Occupied(entry) => Role::Follower(entry.get().sender.subscribe()),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(InflightRequest {
                    id,
                    sender: sender.clone(),
                }));
                Role::Leader(FlightGuard {
                    inflight: &self.inflight,
                    key: key.clone(),
                    id,
                    sender,
                    done: false,
                })
            }
        }
    }

    /// Slot acquisition and the operation share one deadline.
    async fn run_bounded<F, Fut>(&self, operation: F) -> Outcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let bounded = async {
            let permit = self
                .semaphore
                .acquire()
                .await
                .map_err(|_| CacheError::Abandoned("concurrency limiter closed".to_string()))?;
            self.active.fetch_add(1, Ordering::Relaxed);
            let _slot = SlotGuard {
                permit: Some(permit),
                active: &self.active,
                retire_debt: &self.retire_debt,
            };
            operation().await
        };

        match tokio::time::timeout(self.timeout, bounded).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CacheError::Timeout(self.timeout)),
        }
    }

    /// Change the global bound. Idle slots are removed at once; busy ones are retired
    /// as their holders finish.
    pub fn set_max_concurrency(&self, limit: usize) {
        let limit = limit.max(1);
        let previous = self.limit.swap(limit, Ordering::AcqRel);
        if limit > previous {
            let grow = limit - previous;
            // Cancel pending retirements before minting new slots
            let paid = match self
                .retire_debt
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |debt| {
                    Some(debt - debt.min(grow))
                }) {
                Ok(debt) | Err(debt) => debt.min(grow),
            };
            let grow = grow - paid;
            if grow > 0 {
                self.semaphore.add_permits(grow);
            }
        } else if limit < previous {
            let shrink = previous - limit;
            let forgotten = self.semaphore.forget_permits(shrink);
            if forgotten < shrink {
                self.retire_debt
                    .fetch_add(shrink - forgotten, Ordering::AcqRel);
            }
        }
        debug!(previous, limit, "Concurrency limit changed");
    }

    pub fn max_concurrency(&self) -> usize {
        self.limit.load(Ordering::Relaxed)
    }

    /// Fraction of slots currently held, the CPU proxy for adaptive scaling.
    pub fn busy_ratio(&self) -> f64 {
        let limit = self.max_concurrency();
        (self.active.load(Ordering::Relaxed) as f64 / limit as f64).min(1.0)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    /// Keys with an operation currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}
