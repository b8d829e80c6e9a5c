//! Adapters must not depend on each other directly.

use crate::audit::types::{Evidence, Severity, SourceLocation, Violation};
use crate::metrics::{Metric, MetricThreshold};
use crate::model::{ArchitectureQuery, Role, StructuralModel, TypeId};

pub const CONSTRAINT_ID: &str = "hexagonal:adapter-independence";

pub const INDEPENDENCE_METRIC: &str = "hexagonal.adapter.independence";
const INDEPENDENCE_THRESHOLD: f64 = 100.0;

fn is_adapter(model: &StructuralModel, id: &TypeId) -> bool {
    model.unit(id).is_some_and(|u| u.role == Role::Adapter)
}

/// One violation per adapter with direct edges to other adapters,
/// aggregating the targets as evidence.
pub fn check(model: &StructuralModel, _query: Option<&dyn ArchitectureQuery>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for adapter in model.units_with_role(Role::Adapter) {
        let peers: Vec<&TypeId> = model
            .graph()
            .dependencies_of(&adapter.id)
            .filter(|dep| is_adapter(model, dep))
            .collect();

        if peers.is_empty() {
            continue;
        }

        let mut builder = Violation::builder(CONSTRAINT_ID, Severity::Major)
            .message(format!(
                "Adapter '{}' depends directly on {} other adapter(s)",
                adapter.id.simple_name(),
                peers.len()
            ))
            .affected(adapter.id.clone())
            .location(SourceLocation::of_type(adapter.id.clone()));
        for peer in peers {
            builder = builder.evidence(Evidence::Dependency {
                from: adapter.id.clone(),
                to: peer.clone(),
                category: "adapter".to_string(),
            });
        }
        violations.push(builder.build());
    }

    violations
}

/// Percentage of adapter dependencies that do not target another adapter.
/// Adapters with no outgoing dependencies at all are fully independent.
pub fn compute_adapter_independence(model: &StructuralModel) -> Metric {
    let mut total = 0usize;
    let mut inter = 0usize;
    for adapter in model.units_with_role(Role::Adapter) {
        for dep in model.graph().dependencies_of(&adapter.id) {
            total += 1;
            if is_adapter(model, dep) {
                inter += 1;
            }
        }
    }

    let percentage = if total == 0 {
        100.0
    } else {
        (1.0 - inter as f64 / total as f64) * 100.0
    };

    Metric::new(
        INDEPENDENCE_METRIC,
        percentage,
        "percent",
        format!("Adapter independence: {inter} of {total} adapter dependency(ies) target another adapter"),
    )
    .with_threshold(MetricThreshold::less_than(INDEPENDENCE_THRESHOLD))
}
