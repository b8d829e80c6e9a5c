//! Architecture health metrics.
//!
//! Every calculator is a pure function of the structural model; degenerate
//! inputs (empty graphs, zero denominators) produce a documented default
//! value with a "why" description instead of an error, and metric values are
//! always finite. Each metric carries its own threshold-comparison
//! direction: "greater than" for bad-when-high measures, "less than" for
//! bad-when-low ones, and a band for good-range measures.

mod boundary;
mod cohesion;
mod complexity;
mod coupling;
mod fan;
mod modularity;
mod relational;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::StructuralModel;

pub use boundary::{boundary_leaks, compute_aggregate_boundary};
pub use cohesion::{compute_aggregate_cohesion, lcom4};
pub use complexity::compute_mean_complexity;
pub use coupling::{compute_coupling_summary, compute_package_coupling, PackageCoupling, Zone};
pub use fan::compute_fan_metric;
pub use modularity::compute_modularity;
pub use relational::compute_relational_cohesion;

/// Threshold with its comparison direction baked in.
///
/// The direction is part of each metric's contract, never a global default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MetricThreshold {
    /// Exceeded when the value is strictly above the limit (bad-when-high).
    GreaterThan { limit: f64 },
    /// Exceeded when the value is strictly below the limit (bad-when-low);
    /// a value exactly at the limit passes.
    LessThan { limit: f64 },
    /// Exceeded when the value falls outside the inclusive good range.
    Outside { min: f64, max: f64 },
}

impl MetricThreshold {
    pub fn greater_than(limit: f64) -> Self {
        Self::GreaterThan { limit }
    }

    pub fn less_than(limit: f64) -> Self {
        Self::LessThan { limit }
    }

    pub fn outside(min: f64, max: f64) -> Self {
        Self::Outside { min, max }
    }

    pub fn is_exceeded_by(&self, value: f64) -> bool {
        match *self {
            Self::GreaterThan { limit } => value > limit,
            Self::LessThan { limit } => value < limit,
            Self::Outside { min, max } => value < min || value > max,
        }
    }
}

/// A single computed metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    /// Always finite, never NaN or infinite.
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub threshold: Option<MetricThreshold>,
    pub description: String,
}

impl Metric {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        unit: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        debug_assert!(value.is_finite(), "metric values must be finite");
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            threshold: None,
            description: description.into(),
        }
    }

    pub fn with_threshold(mut self, threshold: MetricThreshold) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Whether the value violates this metric's own threshold direction.
    /// Metrics without a threshold never exceed.
    pub fn exceeds_threshold(&self) -> bool {
        self.threshold
            .map(|t| t.is_exceeded_by(self.value))
            .unwrap_or(false)
    }
}

/// Computes the full metric set for a model, keyed by metric name.
///
/// All calculators are pure and independent; the map is ordered so report
/// consumers see a stable layout.
pub fn compute_all(model: &StructuralModel) -> BTreeMap<String, Metric> {
    let mut metrics: Vec<Metric> = compute_coupling_summary(model);
    metrics.push(compute_aggregate_cohesion(model));
    metrics.push(compute_modularity(model));
    metrics.push(compute_fan_metric(model));
    metrics.push(compute_mean_complexity(model));
    metrics.push(compute_relational_cohesion(model));
    metrics.push(compute_aggregate_boundary(model));

    metrics.into_iter().map(|m| (m.name.clone(), m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greater_than_direction() {
        let t = MetricThreshold::greater_than(10.0);
        assert!(t.is_exceeded_by(10.5));
        assert!(!t.is_exceeded_by(10.0));
        assert!(!t.is_exceeded_by(3.0));
    }

    #[test]
    fn test_less_than_is_inclusive_at_the_limit() {
        let t = MetricThreshold::less_than(80.0);
        assert!(t.is_exceeded_by(79.9));
        assert!(!t.is_exceeded_by(80.0));
        assert!(!t.is_exceeded_by(100.0));
    }

    #[test]
    fn test_band_membership() {
        let t = MetricThreshold::outside(1.5, 4.0);
        assert!(t.is_exceeded_by(1.0));
        assert!(t.is_exceeded_by(4.5));
        assert!(!t.is_exceeded_by(1.5));
        assert!(!t.is_exceeded_by(4.0));
        assert!(!t.is_exceeded_by(2.0));
    }

    #[test]
    fn test_metric_without_threshold_never_exceeds() {
        let m = Metric::new("x", 1e9, "count", "unbounded");
        assert!(!m.exceeds_threshold());
    }

    #[test]
    fn test_compute_all_on_empty_model_yields_defaults() {
        let model = StructuralModel::new();
        let metrics = compute_all(&model);

        assert!(!metrics.is_empty());
        for metric in metrics.values() {
            assert!(metric.value.is_finite(), "{} must be finite", metric.name);
        }
        // Vacuous pass: no entities means full encapsulation.
        assert_eq!(metrics["aggregate.boundary"].value, 100.0);
    }
}
