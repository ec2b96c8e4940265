use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use valicache_application::use_cases::ValidateScoreUseCase;
use valicache_domain::{Rule, RuleSet};

/// A grading scheme shared by all of a university's exams.
pub struct University {
    pub name: &'static str,
    pub rules: RuleSet,
}

impl University {
    pub fn catalog() -> Vec<University> {
        vec![
            University {
                name: "percentage",
                rules: RuleSet::exam_score(0.0, 100.0),
            },
            University {
                name: "gpa-scale",
                rules: RuleSet::new(vec![Rule::Range { min: 0.0, max: 4.0 }]),
            },
            University {
                name: "pass-threshold",
                rules: RuleSet::exam_score(0.0, 100.0).with(Rule::Min { value: 40.0 }),
            },
            University {
                name: "twenty-point",
                rules: RuleSet::new(vec![Rule::Max { value: 20.0 }, Rule::Integer]),
            },
        ]
    }
}

#[derive(Debug, Default, Serialize)]
pub struct WorkloadSummary {
    pub validated: u64,
    pub valid: u64,
    pub invalid: u64,
    pub failed: u64,
}

/// Draw a score the way real submissions look: mostly whole numbers in range, some
/// fractional, a few out of range.
fn draw_score() -> f64 {
    match fastrand::u8(0..20) {
        0 => fastrand::i32(-10..0) as f64,
        1 => fastrand::i32(101..120) as f64,
        2 | 3 => fastrand::u8(0..=100) as f64 + 0.5,
        _ => fastrand::u8(0..=100) as f64,
    }
}

/// Validate `students` scores per university per round, all universities concurrently.
pub async fn run(
    use_case: Arc<ValidateScoreUseCase>,
    students: usize,
    rounds: usize,
) -> WorkloadSummary {
    let universities = University::catalog();
    let mut summary = WorkloadSummary::default();

    for round in 1..=rounds {
        let batches = universities.iter().map(|university| {
            let scores: Vec<f64> = (0..students).map(|_| draw_score()).collect();
            let use_case = use_case.clone();
            async move {
                let results = use_case.execute_many(&scores, &university.rules).await;
                (university.name, results)
            }
        });

        for (name, results) in join_all(batches).await {
            for result in results {
                summary.validated += 1;
                match result {
                    Ok(r) if r.is_valid => summary.valid += 1,
                    Ok(_) => summary.invalid += 1,
                    Err(e) => {
                        summary.failed += 1;
                        warn!(university = name, error = %e, "Score validation failed");
                    }
                }
            }
        }
        debug!(round, validated = summary.validated, "Workload round finished");
    }

    info!(
        validated = summary.validated,
        valid = summary.valid,
        invalid = summary.invalid,
        failed = summary.failed,
        "Workload finished"
    );
    summary
}
