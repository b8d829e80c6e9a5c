//! Ports must be wired in the right direction.
//!
//! A driving port is the application's inbound contract, so something in the
//! application layer must implement it. A driven port is an outbound
//! contract, so something in the application layer must call it.

use crate::audit::types::{Severity, SourceLocation, Violation};
use crate::model::{ArchitectureQuery, Layer, Role, StructuralModel, StructuralUnit, TypeId};

pub const CONSTRAINT_ID: &str = "hexagonal:port-direction";

/// Implementor discovery, in priority order: the model's explicit
/// implements-index, then the query handle, then a naming-convention scan.
/// Returns `None` when no mechanism produced anything.
fn resolve_implementors(
    model: &StructuralModel,
    query: Option<&dyn ArchitectureQuery>,
    port: &TypeId,
) -> Option<Vec<TypeId>> {
    if let Some(indexed) = model.indexed_implementors(port) {
        if !indexed.is_empty() {
            return Some(indexed.iter().cloned().collect());
        }
    }

    if let Some(query) = query {
        let found = query.find_implementors(port);
        if !found.is_empty() {
            return Some(found);
        }
    }

    let by_naming = implementors_by_naming(model, port);
    if by_naming.is_empty() {
        None
    } else {
        Some(by_naming)
    }
}

/// `IOrderPort` / `OrderUseCase` style names imply implementors named
/// `OrderImpl`, `OrderService` or `OrderAdapter`.
fn implementors_by_naming(model: &StructuralModel, port: &TypeId) -> Vec<TypeId> {
    let mut stem = port.simple_name();
    if let Some(rest) = stem.strip_prefix('I') {
        if rest.starts_with(char::is_uppercase) {
            stem = rest;
        }
    }
    stem = stem
        .strip_suffix("Port")
        .or_else(|| stem.strip_suffix("UseCase"))
        .unwrap_or(stem);

    let candidates = [
        format!("{stem}Impl"),
        format!("{stem}Service"),
        format!("{stem}Adapter"),
    ];

    model
        .units()
        .filter(|u| u.id != *port && candidates.iter().any(|c| u.id.simple_name() == c))
        .map(|u| u.id.clone())
        .collect()
}

fn in_application_layer(model: &StructuralModel, id: &TypeId) -> bool {
    model.unit(id).is_some_and(|u| u.layer == Layer::Application)
}

fn violation(port: &StructuralUnit, message: String) -> Violation {
    Violation::builder(CONSTRAINT_ID, Severity::Major)
        .message(message)
        .affected(port.id.clone())
        .location(SourceLocation::of_type(port.id.clone()))
        .build()
}

/// Checks both port directions. A port that resolves to nothing in a model
/// with no application-layer types stays silent: the model is too sparse to
/// judge either direction. Once something resolves (an implementor for a
/// driving port, a caller for a driven port), the wiring is checked even
/// when the application layer is empty.
pub fn check(model: &StructuralModel, query: Option<&dyn ArchitectureQuery>) -> Vec<Violation> {
    let has_application_types = model.units_in_layer(Layer::Application).next().is_some();
    let mut violations = Vec::new();

    for port in model.units_with_role(Role::DrivingPort) {
        let satisfied = match resolve_implementors(model, query, &port.id) {
            Some(implementors) => implementors.iter().any(|id| in_application_layer(model, id)),
            None if !has_application_types => continue,
            None => false,
        };
        if !satisfied {
            violations.push(violation(
                port,
                format!(
                    "Driving port '{}' has no application-layer implementor",
                    port.id.simple_name()
                ),
            ));
        }
    }

    for port in model.units_with_role(Role::DrivenPort) {
        let callers = model.graph().dependents_of(&port.id);
        if callers.is_empty() && !has_application_types {
            continue;
        }
        let referenced = callers
            .into_iter()
            .any(|dependent| in_application_layer(model, dependent));
        if !referenced {
            violations.push(violation(
                port,
                format!(
                    "Driven port '{}' is never used from the application layer",
                    port.id.simple_name()
                ),
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeKind;

    fn unit(id: &str, kind: TypeKind, layer: Layer, role: Role) -> StructuralUnit {
        StructuralUnit::new(id, kind, layer, role)
    }

    fn driving_port(id: &str) -> StructuralUnit {
        unit(id, TypeKind::Interface, Layer::Domain, Role::DrivingPort)
    }

    fn app_service(id: &str) -> StructuralUnit {
        unit(id, TypeKind::Class, Layer::Application, Role::ApplicationService)
    }

    #[test]
    fn test_no_application_layer_means_no_op() {
        let mut model = StructuralModel::new();
        model.add_unit(driving_port("shop.port.PlaceOrderUseCase"));

        assert!(check(&model, None).is_empty());
    }

    #[test]
    fn test_infrastructure_implementor_is_flagged_without_application_layer() {
        // An empty application layer is no excuse once the index resolves
        // the port to an infrastructure type.
        let mut model = StructuralModel::new();
        model.add_unit(driving_port("shop.port.PlaceOrderUseCase"));
        model.add_unit(unit(
            "shop.infra.OrderController",
            TypeKind::Class,
            Layer::Infrastructure,
            Role::Adapter,
        ));
        model.add_implementor("shop.port.PlaceOrderUseCase", "shop.infra.OrderController");

        let violations = check(&model, None);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("no application-layer implementor"));
    }

    #[test]
    fn test_indexed_implementor_satisfies_driving_port() {
        let mut model = StructuralModel::new();
        model.add_unit(driving_port("shop.port.PlaceOrderUseCase"));
        model.add_unit(app_service("shop.app.OrderHandler"));
        model.add_implementor("shop.port.PlaceOrderUseCase", "shop.app.OrderHandler");

        assert!(check(&model, None).is_empty());
    }

    #[test]
    fn test_query_fallback_satisfies_driving_port() {
        struct FixedQuery(TypeId);
        impl ArchitectureQuery for FixedQuery {
            fn find_implementors(&self, _port: &TypeId) -> Vec<TypeId> {
                vec![self.0.clone()]
            }
        }

        let mut model = StructuralModel::new();
        model.add_unit(driving_port("shop.port.PlaceOrderUseCase"));
        model.add_unit(app_service("shop.app.OrderHandler"));

        let query = FixedQuery(TypeId::new("shop.app.OrderHandler"));
        assert!(check(&model, Some(&query)).is_empty());
    }

    #[test]
    fn test_naming_heuristic_satisfies_driving_port() {
        let mut model = StructuralModel::new();
        model.add_unit(driving_port("shop.port.PlaceOrderUseCase"));
        model.add_unit(app_service("shop.app.PlaceOrderService"));

        assert!(check(&model, None).is_empty());
    }

    #[test]
    fn test_unimplemented_driving_port_is_flagged() {
        let mut model = StructuralModel::new();
        model.add_unit(driving_port("shop.port.PlaceOrderUseCase"));
        model.add_unit(app_service("shop.app.UnrelatedService"));

        let violations = check(&model, None);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("no application-layer implementor"));
    }

    #[test]
    fn test_driven_port_needs_an_application_caller() {
        let mut model = StructuralModel::new();
        model.add_unit(unit(
            "shop.port.OrderRepository",
            TypeKind::Interface,
            Layer::Domain,
            Role::DrivenPort,
        ));
        model.add_unit(app_service("shop.app.OrderHandler"));

        let violations = check(&model, None);
        assert_eq!(violations.len(), 1);

        model.add_dependency("shop.app.OrderHandler", "shop.port.OrderRepository");
        assert!(check(&model, None).is_empty());
    }
}
