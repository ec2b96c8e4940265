pub mod backends;
pub mod validators;

pub use backends::CountingBackend;
pub use validators::CountingValidator;
