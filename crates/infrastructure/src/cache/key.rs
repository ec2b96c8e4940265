use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use valicache_domain::validators::{validate_rule_set, validate_score_value};
use valicache_domain::{CacheError, RuleSet};

/// Cache key derived from `(score, rule set)`.
///
/// Cheap to clone: the rendered key is shared behind an `Arc<str>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(Arc<str>);

impl CacheKey {
    /// Build the key, rejecting non-finite scores and empty or malformed rule sets
    /// before any I/O happens.
    pub fn from_request(value: f64, rules: &RuleSet) -> Result<Self, CacheError> {
        validate_score_value(value).map_err(CacheError::InvalidParams)?;
        validate_rule_set(rules).map_err(CacheError::InvalidParams)?;

        // -0.0 == 0.0 but would render differently
        let value = if value == 0.0 { 0.0 } else { value };
        Ok(Self(Arc::from(format!(
            "validation:{}:{}",
            value,
            rules.canonical_form()
        ))))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valicache_domain::Rule;

    fn rules() -> RuleSet {
        RuleSet::new(vec![
            Rule::Range {
                min: 0.0,
                max: 100.0,
            },
            Rule::Integer,
        ])
    }

    #[test]
    fn test_equal_inputs_produce_equal_keys() {
        let a = CacheKey::from_request(5.0, &rules()).unwrap();
        let b = CacheKey::from_request(5.0, &rules()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rule_order_does_not_change_key() {
        let reordered = RuleSet::new(vec![
            Rule::Integer,
            Rule::Range {
                min: 0.0,
                max: 100.0,
            },
        ]);
        assert_eq!(
            CacheKey::from_request(88.0, &rules()).unwrap(),
            CacheKey::from_request(88.0, &reordered).unwrap()
        );
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        assert_eq!(
            CacheKey::from_request(-0.0, &rules()).unwrap(),
            CacheKey::from_request(0.0, &rules()).unwrap()
        );
    }

    #[test]
    fn test_different_scores_differ() {
        assert_ne!(
            CacheKey::from_request(5.0, &rules()).unwrap(),
            CacheKey::from_request(5.5, &rules()).unwrap()
        );
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(matches!(
            CacheKey::from_request(f64::NAN, &rules()),
            Err(CacheError::InvalidParams(_))
        ));
        assert!(matches!(
            CacheKey::from_request(f64::INFINITY, &rules()),
            Err(CacheError::InvalidParams(_))
        ));
        assert!(matches!(
            CacheKey::from_request(5.0, &RuleSet::default()),
            Err(CacheError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_key_is_readable() {
        let key = CacheKey::from_request(5.0, &RuleSet::new(vec![Rule::Integer])).unwrap();
        assert_eq!(key.as_str(), "validation:5:[{\"type\":\"integer\"}]");
    }
}
