pub mod compression;
pub mod concurrency;
pub mod eviction;
pub mod key;
pub mod metrics;
pub mod retry;
pub mod scaling;
pub mod storage;
pub mod validation_cache;

pub use compression::{
    Base64Strategy, CompressedPayload, CompressionEngine, CompressionStrategy, DeflateStrategy,
};
pub use concurrency::ConcurrencyController;
pub use eviction::{CapacityDecision, CleanupReport, EntryMeta, EntryStatus, EvictionManager};
pub use key::CacheKey;
pub use metrics::MetricsCollector;
pub use retry::RetryPolicy;
pub use scaling::{AdaptiveScaler, ScalingSample};
pub use storage::{InMemoryBackend, NoopBackend};
pub use validation_cache::ValidationCache;
