use std::sync::Arc;
use std::time::Duration;
use valicache_application::use_cases::{
    ClearCacheUseCase, GetCacheMetricsUseCase, ValidateScoreUseCase,
};
use valicache_domain::{CacheError, RuleSet, ValidationError, ValidationResult};

mod helpers;
use helpers::{MockScoreValidator, MockValidationCache};

fn exam_rules() -> RuleSet {
    RuleSet::exam_score(0.0, 100.0)
}

// ============================================================================
// Tests: ValidateScoreUseCase
// ============================================================================

#[tokio::test]
async fn test_cached_result_is_returned_without_validator() {
    // Arrange
    let cache = Arc::new(MockValidationCache::new());
    let validator = Arc::new(MockScoreValidator::new());
    let cached = ValidationResult::from_errors(
        vec![ValidationError::new("integer", "must be a whole number")],
        vec!["integer".into()],
    );
    cache.preload(72.5, cached.clone()).await;
    let use_case = ValidateScoreUseCase::new(cache.clone(), validator.clone());

    // Act
    let result = use_case.execute(72.5, &exam_rules()).await.unwrap();

    // Assert
    assert_eq!(result, cached);
    assert_eq!(validator.calls(), 0);
}

#[tokio::test]
async fn test_cache_failure_degrades_to_direct_validation() {
    // Arrange
    let cache = Arc::new(MockValidationCache::new());
    cache.fail_with(CacheError::Timeout(Duration::from_secs(30))).await;
    let validator = Arc::new(MockScoreValidator::new());
    let use_case = ValidateScoreUseCase::new(cache.clone(), validator.clone());

    // Act
    let result = use_case.execute(120.0, &exam_rules()).await.unwrap();

    // Assert
    assert!(!result.is_valid);
    assert_eq!(validator.calls(), 1);
    assert_eq!(cache.get_calls(), 1);
}

#[tokio::test]
async fn test_invalid_params_are_not_masked_by_fallback() {
    // Arrange
    let cache = Arc::new(MockValidationCache::new());
    let validator = Arc::new(MockScoreValidator::new());
    let use_case = ValidateScoreUseCase::new(cache, validator.clone());

    // Act
    let result = use_case.execute(f64::NAN, &exam_rules()).await;

    // Assert
    assert!(matches!(result, Err(CacheError::InvalidParams(_))));
    assert_eq!(validator.calls(), 0);
}

#[tokio::test]
async fn test_execute_many_preserves_input_order() {
    // Arrange
    let cache = Arc::new(MockValidationCache::new());
    cache
        .fail_with(CacheError::backend("get", "k", "connection refused"))
        .await;
    let validator = Arc::new(MockScoreValidator::new());
    let use_case = ValidateScoreUseCase::new(cache, validator.clone());

    // Act
    let results = use_case
        .execute_many(&[50.0, 150.0, 99.0], &exam_rules())
        .await;

    // Assert
    let validity: Vec<bool> = results.into_iter().map(|r| r.unwrap().is_valid).collect();
    assert_eq!(validity, vec![true, false, true]);
    assert_eq!(validator.calls(), 3);
}

// ============================================================================
// Tests: cache administration use cases
// ============================================================================

#[tokio::test]
async fn test_clear_cache_use_case() {
    let cache = Arc::new(MockValidationCache::new());
    let use_case = ClearCacheUseCase::new(cache.clone());

    use_case.execute().await.unwrap();

    assert_eq!(cache.clears(), 1);
}

#[tokio::test]
async fn test_clear_cache_propagates_errors() {
    let cache = Arc::new(MockValidationCache::new());
    cache
        .fail_with(CacheError::backend("flush_all", "*", "read-only replica"))
        .await;
    let use_case = ClearCacheUseCase::new(cache);

    assert!(matches!(
        use_case.execute().await,
        Err(CacheError::Backend { .. })
    ));
}

#[tokio::test]
async fn test_get_metrics_use_case_reads_snapshot() {
    let cache = Arc::new(MockValidationCache::new());
    let validator = Arc::new(MockScoreValidator::new());
    let validate = ValidateScoreUseCase::new(cache.clone(), validator);
    validate.execute(10.0, &exam_rules()).await.unwrap();

    let snapshot = GetCacheMetricsUseCase::new(cache).execute();

    assert_eq!(snapshot.hits, 1);
    assert_eq!(snapshot.health.score, 100.0);
}
