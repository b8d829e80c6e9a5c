//! Whole-program fan-out hub detection.

use crate::model::StructuralModel;

use super::{Metric, MetricThreshold};

pub const FAN_METRIC: &str = "architecture.fan.out";
const FAN_OUT_THRESHOLD: f64 = 20.0;

/// Maximum out-degree across the whole dependency graph.
///
/// The metric value is the worst fan-out; the worst fan-in (max in-degree)
/// rides along in the description so hub reports show both directions.
pub fn compute_fan_metric(model: &StructuralModel) -> Metric {
    let graph = model.graph();

    let max_out = graph
        .adjacency()
        .iter()
        .max_by_key(|(_, targets)| targets.len())
        .map(|(id, targets)| (id.clone(), targets.len()));

    let (hub, max_out) = match max_out {
        Some((hub, degree)) if degree > 0 => (hub, degree),
        _ => {
            return Metric::new(
                FAN_METRIC,
                0.0,
                "dependencies",
                "Maximum type fan-out (no dependencies found)",
            );
        }
    };

    let mut in_degrees = std::collections::BTreeMap::new();
    for (_, to) in graph.edges() {
        *in_degrees.entry(to).or_insert(0usize) += 1;
    }
    let (sink, max_in) = in_degrees
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(id, count)| ((*id).clone(), *count))
        .unwrap_or_else(|| (hub.clone(), 0));

    Metric::new(
        FAN_METRIC,
        max_out as f64,
        "dependencies",
        format!("Maximum type fan-out is {max_out} ({hub}); maximum fan-in is {max_in} ({sink})"),
    )
    .with_threshold(MetricThreshold::greater_than(FAN_OUT_THRESHOLD))
}
