pub mod maintenance;
pub mod runner;
pub mod scaling;

pub use maintenance::CacheMaintenanceJob;
pub use runner::{JobRunner, RunningJobs};
pub use scaling::AdaptiveScalingJob;
