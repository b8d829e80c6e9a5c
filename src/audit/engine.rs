//! Audit engine: runs every registered rule plus the metric set.

use tracing::{debug, info};

use crate::metrics;
use crate::model::{ArchitectureQuery, StructuralModel};

use super::rules::{self, default_rules};
use super::types::{AuditOutcome, AuditResult, Violation};

/// Runs all registered rules and all metric calculators against the model.
///
/// Violations mean a Fail outcome; they are findings, not errors, and the
/// call itself cannot fail on model data.
pub fn run_audit(model: &StructuralModel, query: Option<&dyn ArchitectureQuery>) -> AuditResult {
    info!(types = model.type_count(), "starting architecture audit");

    let mut violations: Vec<Violation> = Vec::new();
    for rule in default_rules() {
        let found = (rule.check)(model, query);
        debug!(
            constraint = rule.constraint_id,
            violations = found.len(),
            "rule evaluated"
        );
        violations.extend(found);
    }

    sort_violations(&mut violations);

    let mut metric_map = metrics::compute_all(model);
    let independence = rules::compute_adapter_independence(model);
    metric_map.insert(independence.name.clone(), independence);

    let outcome = if violations.is_empty() {
        AuditOutcome::Pass
    } else {
        AuditOutcome::Fail
    };
    info!(
        violations = violations.len(),
        metrics = metric_map.len(),
        ?outcome,
        "architecture audit finished"
    );

    AuditResult {
        violations,
        metrics: metric_map,
        outcome,
    }
}

/// Worst severity first, then constraint id, then the first affected type.
fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.constraint_id.cmp(&b.constraint_id))
            .then_with(|| a.affected_types.cmp(&b.affected_types))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::types::Severity;
    use crate::model::{Layer, Method, Role, StructuralUnit, TypeKind};

    #[test]
    fn test_clean_model_passes() {
        let mut model = StructuralModel::new();
        model.add_unit(StructuralUnit::new(
            "shop.order.Order",
            TypeKind::Class,
            Layer::Domain,
            Role::AggregateRoot,
        ));

        let result = run_audit(&model, None);
        assert!(result.is_pass());
        assert!(result.violations.is_empty());
        assert!(result.metrics.contains_key("aggregate.boundary"));
        assert!(result.metrics.contains_key("hexagonal.adapter.independence"));
    }

    #[test]
    fn test_violations_sorted_by_severity_then_constraint() {
        let mut model = StructuralModel::new();

        // Critical: impure domain type.
        model.add_unit(StructuralUnit::new(
            "shop.order.Order",
            TypeKind::Class,
            Layer::Domain,
            Role::AggregateRoot,
        ));
        model.add_dependency("shop.order.Order", "jakarta.persistence.Entity");

        // Major: leaked entity.
        model.add_unit(StructuralUnit::new(
            "shop.order.LineItem",
            TypeKind::Class,
            Layer::Domain,
            Role::Entity,
        ));
        model.add_unit(StructuralUnit::new(
            "shop.billing.InvoiceService",
            TypeKind::Class,
            Layer::Domain,
            Role::DomainService,
        ));
        model.add_dependency("shop.billing.InvoiceService", "shop.order.LineItem");

        // Critical: mutable value object.
        let mut money =
            StructuralUnit::new("shop.Money", TypeKind::Class, Layer::Domain, Role::ValueObject);
        money.methods.push(Method::new("setAmount", "void"));
        model.add_unit(money);

        let result = run_audit(&model, None);
        assert_eq!(result.outcome, AuditOutcome::Fail);

        let order: Vec<(&str, Severity)> = result
            .violations
            .iter()
            .map(|v| (v.constraint_id.as_str(), v.severity))
            .collect();
        assert_eq!(
            order,
            vec![
                ("ddd:domain-purity", Severity::Critical),
                ("ddd:value-object-immutable", Severity::Critical),
                ("ddd:aggregate-boundary", Severity::Major),
            ]
        );
    }
}
