//! Domain layer must not depend on infrastructure frameworks.

use crate::audit::types::{Evidence, Severity, SourceLocation, Violation};
use crate::model::{ArchitectureQuery, Layer, StructuralModel};

pub const CONSTRAINT_ID: &str = "ddd:domain-purity";

/// Qualified-name prefixes that mark a dependency as an infrastructure
/// concern, with a category label for the evidence.
const FORBIDDEN_PREFIXES: &[(&str, &str)] = &[
    ("javax.persistence", "persistence"),
    ("jakarta.persistence", "persistence"),
    ("org.hibernate", "persistence"),
    ("org.springframework", "framework"),
    ("com.fasterxml.jackson", "serialization"),
    ("javax.sql", "jdbc"),
    ("java.sql", "jdbc"),
    ("software.amazon", "cloud"),
    ("com.stripe", "cloud"),
    ("com.azure", "cloud"),
    ("com.google.cloud", "cloud"),
    ("org.apache.kafka", "messaging"),
    ("com.rabbitmq", "messaging"),
    ("javax.jms", "messaging"),
    ("jakarta.jms", "messaging"),
    ("javax.servlet", "web"),
    ("jakarta.servlet", "web"),
    ("javax.ws.rs", "web"),
    ("jakarta.ws.rs", "web"),
    ("javax.validation", "validation"),
    ("jakarta.validation", "validation"),
];

fn forbidden_category(qualified_name: &str) -> Option<&'static str> {
    FORBIDDEN_PREFIXES
        .iter()
        .find(|(prefix, _)| qualified_name.starts_with(prefix))
        .map(|(_, category)| *category)
}

/// One violation per impure domain type, aggregating every forbidden
/// dependency as evidence. Infrastructure-layer types are exempt by
/// construction: only Domain-layer types are examined.
pub fn check(model: &StructuralModel, _query: Option<&dyn ArchitectureQuery>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for unit in model.units_in_layer(Layer::Domain) {
        let forbidden: Vec<(&crate::model::TypeId, &'static str)> = model
            .graph()
            .dependencies_of(&unit.id)
            .filter_map(|dep| forbidden_category(dep.qualified_name()).map(|cat| (dep, cat)))
            .collect();

        if forbidden.is_empty() {
            continue;
        }

        let mut builder = Violation::builder(CONSTRAINT_ID, Severity::Critical)
            .message(format!(
                "Domain type '{}' has {} forbidden infrastructure dependency(ies)",
                unit.id.simple_name(),
                forbidden.len()
            ))
            .affected(unit.id.clone())
            .location(SourceLocation::of_type(unit.id.clone()));
        for (dep, category) in forbidden {
            builder = builder.evidence(Evidence::Dependency {
                from: unit.id.clone(),
                to: dep.clone(),
                category: category.to_string(),
            });
        }
        violations.push(builder.build());
    }

    violations
}
