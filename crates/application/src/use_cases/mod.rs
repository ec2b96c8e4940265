pub mod cache;
pub mod scores;

// Re-export use cases
pub use cache::{ClearCacheUseCase, GetCacheMetricsUseCase};
pub use scores::ValidateScoreUseCase;
