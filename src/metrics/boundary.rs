//! Aggregate boundary encapsulation.
//!
//! Every entity owned by an aggregate root should only be referenced from
//! inside the aggregate: the root itself, a sibling member, or any type in
//! the root's package or sub-packages. The metric is the percentage of
//! entities that respect this, counted globally across all aggregates rather
//! than averaged per aggregate.

use crate::model::{Role, StructuralModel, StructuralUnit, TypeId};

use super::{Metric, MetricThreshold};

pub const BOUNDARY_METRIC: &str = "aggregate.boundary";
const BOUNDARY_THRESHOLD: f64 = 80.0;

/// Aggregate roots whose package owns `entity` (same package or below).
fn owning_roots<'a>(model: &'a StructuralModel, entity: &TypeId) -> Vec<&'a StructuralUnit> {
    model
        .units_with_role(Role::AggregateRoot)
        .filter(|root| entity.in_package_or_below(root.id.package()))
        .collect()
}

/// Whether every incoming dependency of `entity` stays inside the boundary
/// of the given root.
fn encapsulated_by(model: &StructuralModel, entity: &TypeId, root: &StructuralUnit) -> bool {
    model
        .graph()
        .dependents_of(entity)
        .into_iter()
        .all(|dependent| dependent == &root.id || dependent.in_package_or_below(root.id.package()))
}

/// External types referencing an entity from outside the boundary of any of
/// its owning roots. Empty for an encapsulated (or unowned) entity.
pub fn boundary_leaks<'a>(model: &'a StructuralModel, entity: &TypeId) -> Vec<&'a TypeId> {
    let roots = owning_roots(model, entity);
    model
        .graph()
        .dependents_of(entity)
        .into_iter()
        .filter(|dependent| {
            !roots.iter().any(|root| {
                *dependent == &root.id || dependent.in_package_or_below(root.id.package())
            })
        })
        .collect()
}

/// Percentage of entities fully encapsulated within an aggregate boundary.
///
/// No entities at all is a vacuous pass (100.0); entities present while the
/// model declares no aggregate roots means nothing is owned (0.0). An entity
/// counts as encapsulated when at least one owning root's boundary contains
/// every incoming dependency.
pub fn compute_aggregate_boundary(model: &StructuralModel) -> Metric {
    let entities: Vec<&StructuralUnit> = model.units_with_role(Role::Entity).collect();

    if entities.is_empty() {
        return Metric::new(
            BOUNDARY_METRIC,
            100.0,
            "percent",
            "Aggregate boundary encapsulation (no entities found)",
        );
    }

    if model.units_with_role(Role::AggregateRoot).next().is_none() {
        return Metric::new(
            BOUNDARY_METRIC,
            0.0,
            "percent",
            format!(
                "Aggregate boundary encapsulation: {} entity(ies) but no aggregate roots",
                entities.len()
            ),
        )
        .with_threshold(MetricThreshold::less_than(BOUNDARY_THRESHOLD));
    }

    let encapsulated = entities
        .iter()
        .filter(|entity| {
            let roots = owning_roots(model, &entity.id);
            !roots.is_empty()
                && roots
                    .iter()
                    .any(|root| encapsulated_by(model, &entity.id, root))
        })
        .count();

    let percentage = encapsulated as f64 / entities.len() as f64 * 100.0;

    Metric::new(
        BOUNDARY_METRIC,
        percentage,
        "percent",
        format!(
            "Aggregate boundary encapsulation: {encapsulated} of {} entity(ies) encapsulated",
            entities.len()
        ),
    )
    .with_threshold(MetricThreshold::less_than(BOUNDARY_THRESHOLD))
}
