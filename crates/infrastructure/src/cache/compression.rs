use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::{BufMut, Bytes, BytesMut};
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use valicache_domain::config::CompressionConfig;
use valicache_domain::{CacheError, CompressionAlgorithm};

use super::metrics::MetricsCollector;

const TAG_RAW: u8 = 0;
const TAG_DEFLATE: u8 = 1;
const TAG_BASE64: u8 = 2;

const SAVINGS_WEIGHT: f64 = 0.7;
const SPEED_WEIGHT: f64 = 0.3;

fn tag_for(algorithm: CompressionAlgorithm) -> u8 {
    match algorithm {
        CompressionAlgorithm::Deflate => TAG_DEFLATE,
        CompressionAlgorithm::Base64 => TAG_BASE64,
    }
}

pub trait CompressionStrategy: Send + Sync {
    fn algorithm(&self) -> CompressionAlgorithm;

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CacheError>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CacheError>;
}

pub struct DeflateStrategy {
    level: u32,
}

impl DeflateStrategy {
    pub fn new(level: u32) -> Self {
        Self { level }
    }
}

impl CompressionStrategy for DeflateStrategy {
    fn algorithm(&self) -> CompressionAlgorithm {
        CompressionAlgorithm::Deflate
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CacheError> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(self.level));
        encoder
            .write_all(data)
            .map_err(|e| CacheError::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| CacheError::Compression(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CacheError> {
        let mut decoder = DeflateDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| CacheError::Compression(format!("deflate: {e}")))?;
        Ok(out)
    }
}

/// Reversible text encoding. It never shrinks a payload, so it only wins when
/// nothing else is usable, which in practice means the payload is stored raw.
pub struct Base64Strategy;

impl CompressionStrategy for Base64Strategy {
    fn algorithm(&self) -> CompressionAlgorithm {
        CompressionAlgorithm::Base64
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CacheError> {
        Ok(STANDARD.encode(data).into_bytes())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CacheError> {
        STANDARD
            .decode(data)
            .map_err(|e| CacheError::Compression(format!("base64: {e}")))
    }
}

fn build_strategy(algorithm: CompressionAlgorithm, level: u32) -> Box<dyn CompressionStrategy> {
    match algorithm {
        CompressionAlgorithm::Deflate => Box::new(DeflateStrategy::new(level)),
        CompressionAlgorithm::Base64 => Box::new(Base64Strategy),
    }
}

/// A framed payload ready for the backend.
#[derive(Debug, Clone)]
pub struct CompressedPayload {
    pub bytes: Bytes,
    pub compressed: bool,
    pub algorithm: Option<CompressionAlgorithm>,
}

struct Candidate {
    algorithm: CompressionAlgorithm,
    bytes: Vec<u8>,
    score: f64,
}

/// Chooses per payload between the configured strategies and raw storage, and
/// adapts its size threshold toward the configured target ratio.
pub struct CompressionEngine {
    config: CompressionConfig,
    strategies: Vec<Box<dyn CompressionStrategy>>,
    threshold: AtomicUsize,
    metrics: Arc<MetricsCollector>,
}

impl CompressionEngine {
    pub fn new(config: CompressionConfig, metrics: Arc<MetricsCollector>) -> Self {
        let strategies = config
            .strategies
            .iter()
            .map(|algorithm| build_strategy(*algorithm, config.level))
            .collect();
        Self::with_strategies(config, strategies, metrics)
    }

    pub fn with_strategies(
        config: CompressionConfig,
        strategies: Vec<Box<dyn CompressionStrategy>>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let threshold = config
            .threshold_bytes
            .clamp(config.min_entry_size, config.max_entry_size);
        metrics.set_adaptive_threshold(threshold);
        Self {
            config,
            strategies,
            threshold: AtomicUsize::new(threshold),
            metrics,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold.load(Ordering::Relaxed)
    }

    fn is_eligible(&self, len: usize) -> bool {
        self.config.enabled
            && !self.strategies.is_empty()
            && len >= self.threshold()
            && len >= self.config.min_entry_size
            && len <= self.config.max_entry_size
    }

    /// Frame `payload`, compressing it when a strategy produces something smaller.
    ///
    /// Never fails: a failing strategy is recorded and skipped.
    pub fn maybe_compress(&self, payload: &[u8]) -> CompressedPayload {
        if !self.is_eligible(payload.len()) {
            self.metrics.record_compression_skipped();
            return CompressedPayload {
                bytes: frame(TAG_RAW, payload),
                compressed: false,
                algorithm: None,
            };
        }

        let budget = self.config.max_compression_time().as_secs_f64();
        let mut best: Option<Candidate> = None;

        for strategy in &self.strategies {
            let algorithm = strategy.algorithm();
            let started = Instant::now();
            let output = match strategy.compress(payload) {
                Ok(output) => output,
                Err(e) => {
                    warn!(strategy = %algorithm, error = %e, "Compression strategy failed");
                    self.metrics.record_strategy_result(algorithm.as_str(), false);
                    continue;
                }
            };
            self.metrics.record_strategy_result(algorithm.as_str(), true);

            if output.len() >= payload.len() {
                continue;
            }
            let score = score(payload.len(), output.len(), started.elapsed().as_secs_f64(), budget);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(Candidate {
                    algorithm,
                    bytes: output,
                    score,
                });
            }
        }

        let result = match best {
            Some(candidate) => {
                self.metrics.record_strategy_selected(candidate.algorithm.as_str());
                debug!(
                    strategy = %candidate.algorithm,
                    original = payload.len(),
                    compressed = candidate.bytes.len(),
                    "Payload compressed"
                );
                CompressedPayload {
                    bytes: frame(tag_for(candidate.algorithm), &candidate.bytes),
                    compressed: true,
                    algorithm: Some(candidate.algorithm),
                }
            }
            None => CompressedPayload {
                bytes: frame(TAG_RAW, payload),
                compressed: false,
                algorithm: None,
            },
        };

        let stored = result.bytes.len() - 1;
        self.metrics
            .record_compression_attempt(payload.len(), stored, result.compressed);
        self.adapt_threshold(stored as f64 / payload.len() as f64);
        result
    }

    pub fn decompress(&self, framed: &[u8]) -> Result<Vec<u8>, CacheError> {
        let (tag, body) = framed
            .split_first()
            .ok_or_else(|| CacheError::Compression("empty frame".to_string()))?;
        match *tag {
            TAG_RAW => Ok(body.to_vec()),
            TAG_DEFLATE => DeflateStrategy::new(self.config.level).decompress(body),
            TAG_BASE64 => Base64Strategy.decompress(body),
            other => Err(CacheError::Compression(format!("unknown codec tag {other}"))),
        }
    }

    fn adapt_threshold(&self, observed_ratio: f64) {
        let factor = if observed_ratio > self.config.target_ratio {
            1.1
        } else {
            0.9
        };
        let current = self.threshold() as f64;
        let next = ((current * factor).round() as usize)
            .clamp(self.config.min_entry_size, self.config.max_entry_size);
        self.threshold.store(next, Ordering::Relaxed);
        self.metrics.set_adaptive_threshold(next);
    }
}

/// Higher is better: weighted size savings plus how far under the time budget it ran.
fn score(original: usize, compressed: usize, elapsed_secs: f64, budget_secs: f64) -> f64 {
    let savings = 1.0 - compressed as f64 / original as f64;
    let speed = if budget_secs > 0.0 {
        (1.0 - elapsed_secs / budget_secs).clamp(0.0, 1.0)
    } else {
        0.0
    };
    savings * SAVINGS_WEIGHT + speed * SPEED_WEIGHT
}

fn frame(tag: u8, body: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(body.len() + 1);
    buf.put_u8(tag);
    buf.put_slice(body);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use valicache_domain::config::MonitoringConfig;

    struct FailingStrategy;

    impl CompressionStrategy for FailingStrategy {
        fn algorithm(&self) -> CompressionAlgorithm {
            CompressionAlgorithm::Deflate
        }

        fn compress(&self, _data: &[u8]) -> Result<Vec<u8>, CacheError> {
            Err(CacheError::Compression("encoder crashed".to_string()))
        }

        fn decompress(&self, _data: &[u8]) -> Result<Vec<u8>, CacheError> {
            Err(CacheError::Compression("decoder crashed".to_string()))
        }
    }

    fn metrics() -> Arc<MetricsCollector> {
        Arc::new(MetricsCollector::new(MonitoringConfig::default()))
    }

    fn small_config() -> CompressionConfig {
        CompressionConfig {
            threshold_bytes: 64,
            min_entry_size: 16,
            ..Default::default()
        }
    }

    fn repetitive(len: usize) -> Vec<u8> {
        b"{\"isValid\":true,\"errors\":[]}".iter().copied().cycle().take(len).collect()
    }

    #[test]
    fn test_small_payload_is_stored_raw() {
        let metrics = metrics();
        let engine = CompressionEngine::new(CompressionConfig::default(), metrics.clone());
        let payload = repetitive(200);

        let out = engine.maybe_compress(&payload);

        assert!(!out.compressed);
        assert_eq!(out.bytes[0], TAG_RAW);
        assert_eq!(engine.decompress(&out.bytes).unwrap(), payload);
        assert_eq!(metrics.snapshot().compression.skipped, 1);
    }

    #[test]
    fn test_large_payload_round_trips_through_deflate() {
        let metrics = metrics();
        let engine = CompressionEngine::new(small_config(), metrics.clone());
        let payload = repetitive(4096);

        let out = engine.maybe_compress(&payload);

        assert!(out.compressed);
        assert_eq!(out.algorithm, Some(CompressionAlgorithm::Deflate));
        assert!(out.bytes.len() < payload.len());
        assert_eq!(engine.decompress(&out.bytes).unwrap(), payload);

        let stats = metrics.snapshot().compression;
        assert_eq!(stats.compressed, 1);
        assert_eq!(stats.strategies["deflate"].selected, 1);
        assert_eq!(stats.strategies["base64"].selected, 0);
    }

    #[test]
    fn test_base64_alone_never_wins() {
        let config = CompressionConfig {
            strategies: vec![CompressionAlgorithm::Base64],
            ..small_config()
        };
        let engine = CompressionEngine::new(config, metrics());
        let out = engine.maybe_compress(&repetitive(1024));
        assert!(!out.compressed);
        assert_eq!(out.bytes[0], TAG_RAW);
    }

    #[test]
    fn test_failing_strategy_falls_back_to_raw() {
        let metrics = metrics();
        let engine = CompressionEngine::with_strategies(
            small_config(),
            vec![Box::new(FailingStrategy)],
            metrics.clone(),
        );
        let payload = repetitive(1024);

        let out = engine.maybe_compress(&payload);

        assert!(!out.compressed);
        assert_eq!(engine.decompress(&out.bytes).unwrap(), payload);
        assert_eq!(metrics.snapshot().compression.failures, 1);
    }

    #[test]
    fn test_threshold_adapts_and_stays_clamped() {
        let engine = CompressionEngine::new(small_config(), metrics());
        assert_eq!(engine.threshold(), 64);

        // Well under the target ratio: threshold drops, but never below min_entry_size
        for _ in 0..50 {
            engine.maybe_compress(&repetitive(4096));
        }
        assert_eq!(engine.threshold(), 16);

        let config = CompressionConfig {
            strategies: vec![CompressionAlgorithm::Base64],
            max_entry_size: 100,
            ..small_config()
        };
        let engine = CompressionEngine::new(config, metrics());
        for _ in 0..50 {
            engine.maybe_compress(&repetitive(100));
        }
        assert_eq!(engine.threshold(), 100);
    }

    #[test]
    fn test_corrupt_frames_are_rejected() {
        let engine = CompressionEngine::new(small_config(), metrics());
        assert!(matches!(engine.decompress(&[]), Err(CacheError::Compression(_))));
        assert!(matches!(engine.decompress(&[9, 1, 2]), Err(CacheError::Compression(_))));
        assert!(matches!(
            engine.decompress(&[TAG_BASE64, b'!', b'!']),
            Err(CacheError::Compression(_))
        ));
    }

    #[test]
    fn test_score_prefers_smaller_output() {
        assert!(score(1000, 200, 0.0, 0.05) > score(1000, 600, 0.0, 0.05));
        assert!(score(1000, 200, 0.0, 0.05) > score(1000, 200, 0.04, 0.05));
        assert_eq!(score(1000, 1000, 1.0, 0.05), 0.0);
    }
}
