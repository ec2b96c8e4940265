use crate::errors::CacheError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub rule: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetadata {
    pub validated_at: DateTime<Utc>,
    pub rules: Vec<String>,
}

/// Outcome of validating a score against a rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub metadata: ValidationMetadata,
}

impl ValidationResult {
    pub fn valid(rules: Vec<String>) -> Self {
        Self::from_errors(Vec::new(), rules)
    }

    /// Builds a result whose validity follows from the error list.
    pub fn from_errors(errors: Vec<ValidationError>, rules: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            metadata: ValidationMetadata {
                validated_at: Utc::now(),
                rules,
            },
        }
    }

    /// A result is well formed when `is_valid` agrees with the error list.
    pub fn check_well_formed(&self) -> Result<(), CacheError> {
        match (self.is_valid, self.errors.is_empty()) {
            (true, false) => Err(CacheError::InvalidParams(format!(
                "result is marked valid but carries {} errors",
                self.errors.len()
            ))),
            (false, true) => Err(CacheError::InvalidParams(
                "result is marked invalid but carries no errors".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errors_derives_validity() {
        let ok = ValidationResult::from_errors(vec![], vec!["integer".into()]);
        assert!(ok.is_valid);

        let bad = ValidationResult::from_errors(
            vec![ValidationError::new("integer", "must be a whole number")],
            vec!["integer".into()],
        );
        assert!(!bad.is_valid);
        assert!(bad.check_well_formed().is_ok());
    }

    #[test]
    fn test_inconsistent_result_is_malformed() {
        let mut result = ValidationResult::valid(vec![]);
        result.is_valid = false;
        assert!(matches!(
            result.check_well_formed(),
            Err(CacheError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_serializes_with_camel_case_fields() {
        let result = ValidationResult::valid(vec!["min:0".into()]);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"isValid\":true"));
        assert!(json.contains("\"validatedAt\""));
    }
}
