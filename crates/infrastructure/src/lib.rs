//! Valicache Infrastructure Layer
pub mod cache;
pub mod validation;

pub use cache::{InMemoryBackend, NoopBackend, ValidationCache};
pub use validation::RangeValidator;
