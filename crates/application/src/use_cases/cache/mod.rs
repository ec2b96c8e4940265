pub mod clear;
pub mod get_metrics;

pub use clear::ClearCacheUseCase;
pub use get_metrics::GetCacheMetricsUseCase;
