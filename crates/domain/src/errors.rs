use std::time::Duration;
use thiserror::Error;

/// Whether a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Backend or compression hiccup, may succeed on a later attempt
    Transient,
    /// Bad input or a deterministic failure, retrying cannot help
    Fatal,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Storage backend failed during {operation} for key {key}: {message}")]
    Backend {
        operation: &'static str,
        key: String,
        message: String,
    },

    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Validation computation failed: {0}")]
    Computation(String),

    #[error("{operation} for key {key} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: &'static str,
        key: String,
        attempts: u32,
        last: Box<CacheError>,
    },

    #[error("In-flight computation for {0} was abandoned")]
    Abandoned(String),
}

impl CacheError {
    pub fn backend(operation: &'static str, key: &str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Default retry classification. A timeout already consumed the whole
    /// operation deadline and is never retried.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Backend { .. } | Self::Compression(_) | Self::Abandoned(_) => {
                ErrorClass::Transient
            }
            Self::InvalidParams(_)
            | Self::Serialization(_)
            | Self::Timeout(_)
            | Self::Computation(_)
            | Self::RetriesExhausted { .. } => ErrorClass::Fatal,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Stable tag used to bucket errors in metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidParams(_) => "invalid_params",
            Self::Backend { .. } => "backend",
            Self::Compression(_) => "compression",
            Self::Serialization(_) => "serialization",
            Self::Timeout(_) => "timeout",
            Self::Computation(_) => "computation",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::Abandoned(_) => "abandoned",
        }
    }
}
