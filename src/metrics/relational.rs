//! Relational cohesion per package.
//!
//! H = (R + 1) / N for each package, where R is the number of dependency
//! edges between types of the package and N is the type count. Healthy
//! packages sit in a band: too low means a bag of unrelated types, too high
//! means an over-entangled clique.

use crate::model::{StructuralModel, TypeId};

use super::{Metric, MetricThreshold};

pub const RELATIONAL_METRIC: &str = "package.cohesion.relational";
const RELATIONAL_MIN: f64 = 1.5;
const RELATIONAL_MAX: f64 = 4.0;

/// Mean relational cohesion H across packages.
pub fn compute_relational_cohesion(model: &StructuralModel) -> Metric {
    let by_package = model.units_by_package();

    if by_package.is_empty() {
        return Metric::new(
            RELATIONAL_METRIC,
            RELATIONAL_MIN,
            "relations",
            "Mean relational cohesion H (no packages found)",
        );
    }

    let mut total_h = 0.0;
    for units in by_package.values() {
        let members: std::collections::BTreeSet<&TypeId> = units.iter().map(|u| &u.id).collect();
        let intra_edges = model
            .graph()
            .edges()
            .filter(|(from, to)| members.contains(from) && members.contains(to))
            .count();
        total_h += (intra_edges as f64 + 1.0) / units.len() as f64;
    }
    let mean = total_h / by_package.len() as f64;

    Metric::new(
        RELATIONAL_METRIC,
        mean,
        "relations",
        format!("Mean relational cohesion H over {} package(s)", by_package.len()),
    )
    .with_threshold(MetricThreshold::outside(RELATIONAL_MIN, RELATIONAL_MAX))
}
