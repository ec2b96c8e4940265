pub mod range_validator;

pub use range_validator::RangeValidator;
