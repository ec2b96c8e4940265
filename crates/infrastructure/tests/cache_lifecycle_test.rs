use std::sync::Arc;
use std::time::Duration;
use valicache_application::ports::CacheMaintenancePort;
use valicache_domain::config::ScalingConfig;
use valicache_domain::{CacheConfig, RuleSet};
use valicache_infrastructure::{RangeValidator, ValidationCache};

mod helpers;
use helpers::{CountingBackend, CountingValidator};

fn build(
    config: CacheConfig,
    backend: &CountingBackend,
    validator: &CountingValidator,
) -> Arc<ValidationCache> {
    Arc::new(
        ValidationCache::new(config, Arc::new(backend.clone()), Arc::new(validator.clone()))
            .unwrap(),
    )
}

fn small(ttl_ms: u64, max_cache_size: usize) -> CacheConfig {
    CacheConfig {
        ttl_ms,
        max_cache_size,
        ..Default::default()
    }
}

fn rules() -> RuleSet {
    RuleSet::exam_score(0.0, 100.0)
}

// ============================================================================
// TTL
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_entry_lives_exactly_ttl() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(small(1000, 100), &backend, &validator);

    cache.get(50.0, &rules()).await.unwrap();

    tokio::time::advance(Duration::from_millis(999)).await;
    cache.get(50.0, &rules()).await.unwrap();
    assert_eq!(validator.calls(), 1);

    tokio::time::advance(Duration::from_millis(2)).await;
    cache.get(50.0, &rules()).await.unwrap();
    assert_eq!(validator.calls(), 2);

    let metrics = cache.metrics();
    assert_eq!(metrics.expirations, 1);
    assert_eq!(metrics.hits, 1);
    assert_eq!(metrics.misses, 2);
}

#[tokio::test(start_paused = true)]
async fn test_hits_do_not_extend_ttl() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(small(1000, 100), &backend, &validator);

    cache.get(50.0, &rules()).await.unwrap();
    for _ in 0..3 {
        tokio::time::advance(Duration::from_millis(300)).await;
        cache.get(50.0, &rules()).await.unwrap();
    }
    assert_eq!(validator.calls(), 1);

    tokio::time::advance(Duration::from_millis(300)).await;
    cache.get(50.0, &rules()).await.unwrap();
    assert_eq!(validator.calls(), 2);
}

// ============================================================================
// Capacity
// ============================================================================

#[tokio::test]
async fn test_capacity_is_never_exceeded() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(small(60_000, 5), &backend, &validator);

    for i in 0..8 {
        let value = i as f64;
        cache
            .set(value, &rules(), RangeValidator.evaluate(value, &rules()))
            .await
            .unwrap();
        assert!(cache.len() <= 5);
        assert!(backend.stored() <= 5);
    }

    assert!(cache.metrics().evictions >= 3);
}

#[tokio::test]
async fn test_least_recently_used_entry_is_evicted() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(small(1000, 2), &backend, &validator);

    cache.get(1.0, &rules()).await.unwrap();
    cache.get(2.0, &rules()).await.unwrap();
    cache.get(3.0, &rules()).await.unwrap();
    assert_eq!(validator.calls(), 3);
    assert_eq!(cache.metrics().evictions, 1);

    cache.get(2.0, &rules()).await.unwrap();
    assert_eq!(validator.calls(), 3);

    cache.get(1.0, &rules()).await.unwrap();
    assert_eq!(validator.calls(), 4);
    assert!(backend.stored() <= 2);
}

// ============================================================================
// Maintenance
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_maintenance_sweeps_expired_entries() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(small(1000, 100), &backend, &validator);
    for v in [10.0, 20.0, 30.0] {
        cache.get(v, &rules()).await.unwrap();
    }

    tokio::time::advance(Duration::from_millis(1500)).await;
    let report = cache.run_maintenance().await;

    assert_eq!(report.expired, 3);
    assert_eq!(report.evicted, 0);
    assert_eq!(report.entries, 0);
    assert!(report.health_score > 0.0);
    assert_eq!(backend.stored(), 0);
    assert_eq!(backend.deletes(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_maintenance_through_port() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(small(1000, 100), &backend, &validator);
    cache.get(10.0, &rules()).await.unwrap();
    let port: Arc<dyn CacheMaintenancePort> = cache.clone();

    let report = port.run_maintenance().await;

    assert_eq!(report.entries, 1);
    assert_eq!(report.expired, 0);
}

// ============================================================================
// Adaptive scaling
// ============================================================================

fn scaling_enabled(max_cache_size: usize) -> CacheConfig {
    CacheConfig {
        max_cache_size,
        scaling: ScalingConfig {
            enabled: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_scaling_disabled_by_default() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(CacheConfig::default(), &backend, &validator);

    assert_eq!(cache.run_scaling_cycle().await, None);
    assert_eq!(cache.max_entries(), 1000);
}

#[tokio::test(start_paused = true)]
async fn test_idle_cache_scales_down() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(scaling_enabled(1000), &backend, &validator);

    assert_eq!(cache.run_scaling_cycle().await, Some(0.75));

    assert_eq!(cache.max_entries(), 750);
    let metrics = cache.metrics();
    assert_eq!(metrics.scale_factor, 0.75);
    assert_eq!(metrics.max_concurrent_operations, 4);

    // Cooldown holds the factor
    assert_eq!(cache.run_scaling_cycle().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_shrinking_capacity_evicts_immediately() {
    let backend = CountingBackend::new();
    let validator = CountingValidator::new();
    let cache = build(scaling_enabled(4), &backend, &validator);
    for i in 0..4 {
        let value = i as f64;
        cache
            .set(value, &rules(), RangeValidator.evaluate(value, &rules()))
            .await
            .unwrap();
    }

    assert_eq!(cache.run_scaling_cycle().await, Some(0.75));

    assert_eq!(cache.max_entries(), 3);
    assert!(cache.len() <= 3);
    assert!(backend.stored() <= 3);
}
