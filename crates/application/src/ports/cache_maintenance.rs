use async_trait::async_trait;
use valicache_domain::MaintenanceReport;

/// Hooks the background jobs drive.
#[async_trait]
pub trait CacheMaintenancePort: Send + Sync {
    /// Expire and evict entries, sample trends, re-evaluate health.
    async fn run_maintenance(&self) -> MaintenanceReport;

    /// Re-evaluate the adaptive scale factor; returns the new factor when it changed.
    async fn run_scaling_cycle(&self) -> Option<f64>;
}
