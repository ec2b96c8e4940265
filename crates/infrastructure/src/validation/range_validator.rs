use async_trait::async_trait;
use valicache_application::ports::ScoreValidator;
use valicache_domain::validators::{validate_rule_set, validate_score_value};
use valicache_domain::{CacheError, Rule, RuleSet, ValidationError, ValidationResult};

/// Evaluates every rule in the set and reports one error per violated rule.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeValidator;

impl RangeValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, value: f64, rules: &RuleSet) -> ValidationResult {
        let errors = rules
            .iter()
            .filter(|rule| !rule.is_satisfied_by(value))
            .map(|rule| ValidationError::new(rule.name(), violation_message(rule, value)))
            .collect();
        ValidationResult::from_errors(errors, rules.names())
    }
}

fn violation_message(rule: &Rule, value: f64) -> String {
    match rule {
        Rule::Min { value: min } => format!("score {value} is below the minimum of {min}"),
        Rule::Max { value: max } => format!("score {value} is above the maximum of {max}"),
        Rule::Range { min, max } => format!("score {value} is outside {min}..{max}"),
        Rule::Integer => format!("score {value} must be a whole number"),
    }
}

#[async_trait]
impl ScoreValidator for RangeValidator {
    async fn validate(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError> {
        validate_score_value(value).map_err(CacheError::InvalidParams)?;
        validate_rule_set(rules).map_err(CacheError::InvalidParams)?;
        Ok(self.evaluate(value, rules))
    }
}
