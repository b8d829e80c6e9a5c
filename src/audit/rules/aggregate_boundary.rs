//! Entities inside an aggregate must only be referenced from within it.

use crate::audit::types::{Evidence, Severity, SourceLocation, Violation};
use crate::metrics::boundary_leaks;
use crate::model::{ArchitectureQuery, Role, StructuralModel};

pub const CONSTRAINT_ID: &str = "ddd:aggregate-boundary";

/// One violation per owned entity referenced from outside its aggregate
/// boundary, with every external dependent as evidence. Entities not owned
/// by any aggregate root are out of scope here; the boundary metric accounts
/// for them.
pub fn check(model: &StructuralModel, _query: Option<&dyn ArchitectureQuery>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for entity in model.units_with_role(Role::Entity) {
        let owned = model
            .units_with_role(Role::AggregateRoot)
            .any(|root| entity.id.in_package_or_below(root.id.package()));
        if !owned {
            continue;
        }

        let leaks = boundary_leaks(model, &entity.id);
        if leaks.is_empty() {
            continue;
        }

        let mut builder = Violation::builder(CONSTRAINT_ID, Severity::Major)
            .message(format!(
                "Entity '{}' is referenced from {} type(s) outside its aggregate boundary",
                entity.id.simple_name(),
                leaks.len()
            ))
            .affected(entity.id.clone())
            .location(SourceLocation::of_type(entity.id.clone()));
        for leaker in leaks {
            builder = builder.evidence(Evidence::Dependency {
                from: leaker.clone(),
                to: entity.id.clone(),
                category: "boundary-leak".to_string(),
            });
        }
        violations.push(builder.build());
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Layer, StructuralUnit, TypeKind};

    fn unit(id: &str, role: Role) -> StructuralUnit {
        StructuralUnit::new(id, TypeKind::Class, Layer::Domain, role)
    }

    #[test]
    fn test_encapsulated_aggregate_passes() {
        let mut model = StructuralModel::new();
        model.add_unit(unit("shop.order.Order", Role::AggregateRoot));
        model.add_unit(unit("shop.order.LineItem", Role::Entity));
        model.add_dependency("shop.order.Order", "shop.order.LineItem");

        assert!(check(&model, None).is_empty());
    }

    #[test]
    fn test_external_reference_is_a_violation() {
        let mut model = StructuralModel::new();
        model.add_unit(unit("shop.order.Order", Role::AggregateRoot));
        model.add_unit(unit("shop.order.LineItem", Role::Entity));
        model.add_unit(unit("shop.billing.InvoiceService", Role::DomainService));
        model.add_dependency("shop.billing.InvoiceService", "shop.order.LineItem");

        let violations = check(&model, None);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Major);
        assert!(matches!(
            &violations[0].evidence[0],
            Evidence::Dependency { from, .. } if from.simple_name() == "InvoiceService"
        ));
    }

    #[test]
    fn test_unowned_entities_are_skipped() {
        // An entity with no aggregate root over it is not this rule's call.
        let mut model = StructuralModel::new();
        model.add_unit(unit("shop.misc.Orphan", Role::Entity));
        model.add_unit(unit("shop.web.Controller", Role::Adapter));
        model.add_dependency("shop.web.Controller", "shop.misc.Orphan");

        assert!(check(&model, None).is_empty());
    }
}
