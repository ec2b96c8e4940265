use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Codec a payload can be stored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionAlgorithm {
    /// General-purpose DEFLATE stream
    Deflate,
    /// Reversible text encoding; only wins when it somehow shrinks the payload
    Base64,
}

impl CompressionAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deflate => "deflate",
            Self::Base64 => "base64",
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adaptive payload compression
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompressionConfig {
    /// Master switch (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Initial adaptive threshold in bytes (default: 51200)
    #[serde(default = "default_threshold_bytes")]
    pub threshold_bytes: usize,

    /// Payloads smaller than this are never compressed (default: 1024)
    #[serde(default = "default_min_entry_size")]
    pub min_entry_size: usize,

    /// Payloads larger than this are never compressed (default: 10 MiB)
    #[serde(default = "default_max_entry_size")]
    pub max_entry_size: usize,

    /// Compressed/original ratio the threshold steers toward (default: 0.6)
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f64,

    /// Time budget used when scoring a strategy, in milliseconds (default: 50)
    #[serde(default = "default_max_compression_time_ms")]
    pub max_compression_time_ms: u64,

    /// DEFLATE level 0-9 (default: 6)
    #[serde(default = "default_level")]
    pub level: u32,

    /// Strategies evaluated for each payload (default: deflate, base64)
    #[serde(default = "default_strategies")]
    pub strategies: Vec<CompressionAlgorithm>,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_bytes: default_threshold_bytes(),
            min_entry_size: default_min_entry_size(),
            max_entry_size: default_max_entry_size(),
            target_ratio: default_target_ratio(),
            max_compression_time_ms: default_max_compression_time_ms(),
            level: default_level(),
            strategies: default_strategies(),
        }
    }
}

impl CompressionConfig {
    pub fn max_compression_time(&self) -> Duration {
        Duration::from_millis(self.max_compression_time_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_entry_size > self.max_entry_size {
            return Err(format!(
                "compression.min_entry_size ({}) exceeds max_entry_size ({})",
                self.min_entry_size, self.max_entry_size
            ));
        }
        if self.target_ratio <= 0.0 || self.target_ratio > 1.0 {
            return Err(format!(
                "compression.target_ratio must be within (0, 1], got {}",
                self.target_ratio
            ));
        }
        if self.max_compression_time_ms == 0 {
            return Err("compression.max_compression_time_ms must be positive".to_string());
        }
        if self.level > 9 {
            return Err(format!("compression.level must be 0-9, got {}", self.level));
        }
        if self.enabled && self.strategies.is_empty() {
            return Err("compression is enabled but no strategies are configured".to_string());
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_threshold_bytes() -> usize {
    50 * 1024
}

fn default_min_entry_size() -> usize {
    1024
}

fn default_max_entry_size() -> usize {
    10 * 1024 * 1024
}

fn default_target_ratio() -> f64 {
    0.6
}

fn default_max_compression_time_ms() -> u64 {
    50
}

fn default_level() -> u32 {
    6
}

fn default_strategies() -> Vec<CompressionAlgorithm> {
    vec![CompressionAlgorithm::Deflate, CompressionAlgorithm::Base64]
}
