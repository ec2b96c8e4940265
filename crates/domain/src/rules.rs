use serde::{Deserialize, Serialize};
use std::fmt;

/// A single numeric predicate a score must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Score must be `>= value`
    Min { value: f64 },
    /// Score must be `<= value`
    Max { value: f64 },
    /// Score must lie in `[min, max]`
    Range { min: f64, max: f64 },
    /// Score must have no fractional part
    Integer,
}

impl Rule {
    /// Stable display name, also stored in result metadata.
    pub fn name(&self) -> String {
        match self {
            Self::Min { value } => format!("min:{value}"),
            Self::Max { value } => format!("max:{value}"),
            Self::Range { min, max } => format!("range:{min}..{max}"),
            Self::Integer => "integer".to_string(),
        }
    }

    pub fn is_satisfied_by(&self, score: f64) -> bool {
        match self {
            Self::Min { value } => score >= *value,
            Self::Max { value } => score <= *value,
            Self::Range { min, max } => score >= *min && score <= *max,
            Self::Integer => score.fract() == 0.0,
        }
    }

    pub fn check_bounds(&self) -> Result<(), String> {
        match self {
            Self::Min { value } | Self::Max { value } if !value.is_finite() => {
                Err(format!("rule {} has a non-finite bound", self.name()))
            }
            Self::Range { min, max } if !min.is_finite() || !max.is_finite() => {
                Err(format!("rule {} has a non-finite bound", self.name()))
            }
            Self::Range { min, max } if min > max => {
                Err(format!("rule {} has min greater than max", self.name()))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The rule set a score is validated against.
///
/// Identity is order-insensitive: `[min:0, max:100]` and `[max:100, min:0]` describe
/// the same constraints and share one canonical form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Typical exam score constraints: integer within `[min, max]`.
    pub fn exam_score(min: f64, max: f64) -> Self {
        Self::new(vec![Rule::Range { min, max }, Rule::Integer])
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(Rule::name).collect()
    }

    /// Deterministic serialization: each rule as JSON, sorted and deduplicated.
    pub fn canonical_form(&self) -> String {
        let mut parts: Vec<String> = self
            .rules
            .iter()
            .map(|rule| serde_json::to_string(rule).unwrap_or_else(|_| rule.name()))
            .collect();
        parts.sort_unstable();
        parts.dedup();
        format!("[{}]", parts.join(","))
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
