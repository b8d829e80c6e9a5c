//! Value objects must be immutable.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::audit::types::{Evidence, Severity, SourceLocation, Violation};
use crate::model::{ArchitectureQuery, Role, StructuralModel};

pub const CONSTRAINT_ID: &str = "ddd:value-object-immutable";

/// Matches `setX` (camel case) and `set_x` (snake case) mutator names.
static SETTER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^set(?:[A-Z]|_[a-z0-9])").expect("setter pattern is valid"));

/// One violation per mutable value object, listing every setter as
/// behavioral evidence.
pub fn check(model: &StructuralModel, _query: Option<&dyn ArchitectureQuery>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for unit in model.units_with_role(Role::ValueObject) {
        let setters: Vec<&str> = unit
            .methods
            .iter()
            .filter(|m| !m.is_constructor && SETTER_PATTERN.is_match(&m.name))
            .map(|m| m.name.as_str())
            .collect();

        if setters.is_empty() {
            continue;
        }

        let mut builder = Violation::builder(CONSTRAINT_ID, Severity::Critical)
            .message(format!(
                "Value object '{}' exposes {} setter method(s)",
                unit.id.simple_name(),
                setters.len()
            ))
            .affected(unit.id.clone())
            .location(SourceLocation::of_type(unit.id.clone()));
        for setter in setters {
            builder = builder.evidence(Evidence::Behavioral {
                method: setter.to_string(),
                detail: "mutator on an immutable value object".to_string(),
            });
        }
        violations.push(builder.build());
    }

    violations
}
