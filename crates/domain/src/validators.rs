use crate::rules::RuleSet;

pub fn validate_score_value(value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("score must be a finite number, got {value}"));
    }
    Ok(())
}

pub fn validate_rule_set(rules: &RuleSet) -> Result<(), String> {
    if rules.is_empty() {
        return Err("rule set cannot be empty".to_string());
    }
    for rule in rules.iter() {
        rule.check_bounds()?;
    }
    Ok(())
}

pub fn validate_ratio(name: &str, value: f64) -> Result<(), String> {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{name} must be within [0, 1], got {value}"));
    }
    Ok(())
}
