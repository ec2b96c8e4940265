pub mod alerts;
pub mod collector;
pub mod health;
pub mod ring;

pub use alerts::AlertManager;
pub use collector::MetricsCollector;
pub use health::{HealthInputs, HealthScorer};
pub use ring::RingBuffer;
