//! Mean method complexity across the model.

use crate::model::StructuralModel;

use super::{Metric, MetricThreshold};

pub const COMPLEXITY_METRIC: &str = "code.complexity.mean";
const COMPLEXITY_THRESHOLD: f64 = 10.0;

/// Mean declared cyclomatic complexity over every method carrying a score.
///
/// Methods without a frontend-provided score are skipped; a model with no
/// scored methods at all defaults to a trivially simple 1.0.
pub fn compute_mean_complexity(model: &StructuralModel) -> Metric {
    let scores: Vec<u32> = model
        .units()
        .flat_map(|u| u.methods.iter())
        .filter_map(|m| m.complexity)
        .collect();

    if scores.is_empty() {
        return Metric::new(
            COMPLEXITY_METRIC,
            1.0,
            "paths",
            "Mean method complexity (no complexity data in the model)",
        );
    }

    let mean = scores.iter().map(|&c| c as f64).sum::<f64>() / scores.len() as f64;

    Metric::new(
        COMPLEXITY_METRIC,
        mean,
        "paths",
        format!("Mean cyclomatic complexity over {} scored method(s)", scores.len()),
    )
    .with_threshold(MetricThreshold::greater_than(COMPLEXITY_THRESHOLD))
}
