//! Architecture rules and the static rule registry.
//!
//! Each rule is a pure function of the model plus an optional query handle.
//! The registry is assembled statically; there is no runtime discovery.

mod adapter_independence;
mod aggregate_boundary;
mod aggregate_cycle;
mod domain_purity;
mod port_direction;
mod value_object;

use crate::model::{ArchitectureQuery, StructuralModel};

use super::types::{Severity, Violation};

pub use adapter_independence::compute_adapter_independence;

pub type RuleCheck = fn(&StructuralModel, Option<&dyn ArchitectureQuery>) -> Vec<Violation>;

/// Static description of one rule: stable constraint id, severity it emits
/// at, and the check function itself.
#[derive(Clone, Copy)]
pub struct RuleDescriptor {
    pub constraint_id: &'static str,
    pub default_severity: Severity,
    pub check: RuleCheck,
}

/// All built-in rules, in registration order.
pub fn default_rules() -> &'static [RuleDescriptor] {
    &[
        RuleDescriptor {
            constraint_id: domain_purity::CONSTRAINT_ID,
            default_severity: Severity::Critical,
            check: domain_purity::check,
        },
        RuleDescriptor {
            constraint_id: value_object::CONSTRAINT_ID,
            default_severity: Severity::Critical,
            check: value_object::check,
        },
        RuleDescriptor {
            constraint_id: aggregate_cycle::CONSTRAINT_ID,
            default_severity: Severity::Blocker,
            check: aggregate_cycle::check,
        },
        RuleDescriptor {
            constraint_id: aggregate_boundary::CONSTRAINT_ID,
            default_severity: Severity::Major,
            check: aggregate_boundary::check,
        },
        RuleDescriptor {
            constraint_id: port_direction::CONSTRAINT_ID,
            default_severity: Severity::Major,
            check: port_direction::check,
        },
        RuleDescriptor {
            constraint_id: adapter_independence::CONSTRAINT_ID,
            default_severity: Severity::Major,
            check: adapter_independence::check,
        },
    ]
}
