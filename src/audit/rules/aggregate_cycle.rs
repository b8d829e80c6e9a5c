//! Aggregates must not depend on each other in cycles.
//!
//! Aggregate roots are consistency boundaries. A dependency cycle between
//! roots collapses two boundaries into one and makes transaction scope
//! ambiguous, so any cycle is a blocker.

use std::collections::{BTreeMap, BTreeSet};

use crate::audit::types::{Evidence, Severity, SourceLocation, Violation};
use crate::graph::find_cycles;
use crate::model::{ArchitectureQuery, Role, StructuralModel, TypeId};

pub const CONSTRAINT_ID: &str = "ddd:aggregate-cycle";

/// One violation per dependency cycle among aggregate roots. Only direct
/// root-to-root edges count; a path through a non-aggregate type does not
/// close a cycle.
pub fn check(model: &StructuralModel, _query: Option<&dyn ArchitectureQuery>) -> Vec<Violation> {
    let roots: BTreeSet<TypeId> = model
        .units_with_role(Role::AggregateRoot)
        .map(|unit| unit.id.clone())
        .collect();
    if roots.len() < 2 {
        return Vec::new();
    }

    let mut edges: BTreeMap<TypeId, BTreeSet<TypeId>> = BTreeMap::new();
    for root in &roots {
        let targets: BTreeSet<TypeId> = model
            .graph()
            .dependencies_of(root)
            .filter(|target| roots.contains(*target))
            .cloned()
            .collect();
        if !targets.is_empty() {
            edges.insert(root.clone(), targets);
        }
    }

    find_cycles(&roots, &edges)
        .iter()
        .map(|cycle| violation_for(cycle))
        .collect()
}

/// `cycle` is a closed path: the entry node repeats at the end.
fn violation_for(cycle: &[TypeId]) -> Violation {
    let names: Vec<&str> = cycle.iter().map(TypeId::simple_name).collect();
    let mut builder = Violation::builder(CONSTRAINT_ID, Severity::Blocker)
        .message(format!(
            "Circular dependency between aggregates: {}",
            names.join(" -> ")
        ))
        .location(SourceLocation::of_type(cycle[0].clone()));

    for member in &cycle[..cycle.len() - 1] {
        builder = builder.affected(member.clone());
    }
    for edge in cycle.windows(2) {
        builder = builder.evidence(Evidence::Dependency {
            from: edge[0].clone(),
            to: edge[1].clone(),
            category: "aggregate-cycle".to_string(),
        });
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Layer, StructuralUnit, TypeKind};

    fn aggregate(id: &str) -> StructuralUnit {
        StructuralUnit::new(id, TypeKind::Class, Layer::Domain, Role::AggregateRoot)
    }

    fn entity(id: &str) -> StructuralUnit {
        StructuralUnit::new(id, TypeKind::Class, Layer::Domain, Role::Entity)
    }

    #[test]
    fn test_linear_dependencies_pass() {
        let mut model = StructuralModel::new();
        model.add_unit(aggregate("shop.Order"));
        model.add_unit(aggregate("shop.Customer"));
        model.add_unit(aggregate("shop.Product"));
        model.add_dependency("shop.Order", "shop.Customer");
        model.add_dependency("shop.Customer", "shop.Product");

        assert!(check(&model, None).is_empty());
    }

    #[test]
    fn test_direct_cycle_is_a_blocker() {
        let mut model = StructuralModel::new();
        model.add_unit(aggregate("shop.Order"));
        model.add_unit(aggregate("shop.Customer"));
        model.add_dependency("shop.Order", "shop.Customer");
        model.add_dependency("shop.Customer", "shop.Order");

        let violations = check(&model, None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Blocker);
        assert!(violations[0].message.contains("Circular dependency"));
        assert!(violations[0].message.contains("Order"));
        assert!(violations[0].message.contains("Customer"));
        assert_eq!(violations[0].affected_types.len(), 2);
        assert_eq!(violations[0].evidence.len(), 2);
    }

    #[test]
    fn test_indirect_cycle_names_every_member() {
        let mut model = StructuralModel::new();
        model.add_unit(aggregate("shop.Order"));
        model.add_unit(aggregate("shop.Customer"));
        model.add_unit(aggregate("shop.Product"));
        model.add_dependency("shop.Order", "shop.Customer");
        model.add_dependency("shop.Customer", "shop.Product");
        model.add_dependency("shop.Product", "shop.Order");

        let violations = check(&model, None);
        assert_eq!(violations.len(), 1);
        for name in ["Order", "Customer", "Product"] {
            assert!(violations[0].message.contains(name), "{name}");
        }
        assert_eq!(violations[0].affected_types.len(), 3);
    }

    #[test]
    fn test_path_through_entity_does_not_close_a_cycle() {
        // Order -> LineItem -> Customer -> Order is not root-to-root all
        // the way round, so no cycle among aggregates.
        let mut model = StructuralModel::new();
        model.add_unit(aggregate("shop.Order"));
        model.add_unit(aggregate("shop.Customer"));
        model.add_unit(entity("shop.LineItem"));
        model.add_dependency("shop.Order", "shop.LineItem");
        model.add_dependency("shop.LineItem", "shop.Customer");
        model.add_dependency("shop.Customer", "shop.Order");

        assert!(check(&model, None).is_empty());
    }
}
