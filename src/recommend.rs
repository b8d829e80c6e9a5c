//! Turns grouped violations into actionable recommendations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::audit::{AuditResult, Severity, Violation};
use crate::model::TypeId;

/// Constraint families that always demand immediate structural attention,
/// whatever severity the individual findings carry.
const ALWAYS_ARCHITECTURAL: &[&str] = &["ddd:aggregate-boundary", "ddd:aggregate-cycle"];
const ARCHITECTURAL_PREFIX: &str = "hexagonal:";

const MAX_LISTED_TYPES: usize = 5;
const MAX_LISTED_MESSAGES: usize = 3;

/// Urgency band for one recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Immediate,
    ShortTerm,
    MediumTerm,
    Low,
}

impl Priority {
    fn rank(self) -> u8 {
        match self {
            Priority::Immediate => 0,
            Priority::ShortTerm => 1,
            Priority::MediumTerm => 2,
            Priority::Low => 3,
        }
    }
}

/// One remediation suggestion covering all violations of a constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub constraint_id: String,
    pub title: String,
    pub description: String,
    /// What resolving this recommendation is expected to achieve.
    pub impact: String,
    pub priority: Priority,
    /// Estimated remediation effort in days.
    pub effort_days: f64,
    /// Deduplicated, alphabetically sorted.
    pub affected_types: Vec<TypeId>,
}

/// Fixed per-violation remediation cost in days.
fn effort_for(severity: Severity) -> f64 {
    match severity {
        Severity::Blocker => 3.0,
        Severity::Critical => 2.0,
        Severity::Major => 0.5,
        Severity::Minor => 0.25,
        Severity::Info => 0.0,
    }
}

fn is_always_architectural(constraint_id: &str) -> bool {
    constraint_id.starts_with(ARCHITECTURAL_PREFIX) || ALWAYS_ARCHITECTURAL.contains(&constraint_id)
}

fn priority_for(constraint_id: &str, violations: &[&Violation], affected: usize) -> Priority {
    let worst = violations
        .iter()
        .map(|v| v.severity)
        .max()
        .unwrap_or(Severity::Info);

    if worst >= Severity::Critical || is_always_architectural(constraint_id) {
        Priority::Immediate
    } else if worst == Severity::Major {
        if affected >= 3 {
            Priority::ShortTerm
        } else {
            Priority::MediumTerm
        }
    } else {
        Priority::Low
    }
}

fn impact_for(priority: Priority, affected: usize) -> String {
    match priority {
        Priority::Immediate => {
            "Resolving this critical issue will restore architectural integrity and prevent system degradation.".to_string()
        }
        Priority::ShortTerm => format!(
            "Addressing these violations will improve maintainability across {affected} types and reduce future refactoring costs."
        ),
        Priority::MediumTerm => {
            "Fixing this issue will improve code quality and reduce technical debt for the affected components.".to_string()
        }
        Priority::Low => {
            "This enhancement will marginally improve code quality with minimal impact on system behavior.".to_string()
        }
    }
}

/// `ddd:domain-purity` -> "Domain Purity".
fn rule_title(constraint_id: &str) -> String {
    let name = constraint_id.rsplit(':').next().unwrap_or(constraint_id);
    name.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(affected: &[TypeId], violations: &[&Violation]) -> String {
    let listed: Vec<&str> = affected
        .iter()
        .take(MAX_LISTED_TYPES)
        .map(TypeId::qualified_name)
        .collect();
    let mut description = format!("Affected types: {}", listed.join(", "));
    if affected.len() > MAX_LISTED_TYPES {
        description.push_str(&format!(" … and {} more", affected.len() - MAX_LISTED_TYPES));
    }
    description.push('.');

    let messages: Vec<&str> = violations
        .iter()
        .take(MAX_LISTED_MESSAGES)
        .map(|v| v.message.as_str())
        .collect();
    if !messages.is_empty() {
        description.push(' ');
        description.push_str(&messages.join(" "));
    }
    if violations.len() > MAX_LISTED_MESSAGES {
        description.push_str(&format!(
            " … and {} more violations",
            violations.len() - MAX_LISTED_MESSAGES
        ));
    }
    description
}

/// Builds recommendations from an audit result: one per violated constraint,
/// sorted by priority.
pub fn generate_recommendations(result: &AuditResult) -> Vec<Recommendation> {
    let mut by_constraint: BTreeMap<&str, Vec<&Violation>> = BTreeMap::new();
    for violation in &result.violations {
        by_constraint
            .entry(violation.constraint_id.as_str())
            .or_default()
            .push(violation);
    }

    let mut recommendations: Vec<Recommendation> = by_constraint
        .into_iter()
        .map(|(constraint_id, violations)| {
            let mut affected: Vec<TypeId> = violations
                .iter()
                .flat_map(|v| v.affected_types.iter().cloned())
                .collect();
            affected.sort();
            affected.dedup();

            let priority = priority_for(constraint_id, &violations, affected.len());
            let effort_days = violations.iter().map(|v| effort_for(v.severity)).sum();

            let mut title = rule_title(constraint_id);
            if violations.len() > 1 {
                title.push_str(&format!(" ({} violations)", violations.len()));
            }

            Recommendation {
                constraint_id: constraint_id.to_string(),
                description: describe(&affected, &violations),
                impact: impact_for(priority, affected.len()),
                title,
                priority,
                effort_days,
                affected_types: affected,
            }
        })
        .collect();

    recommendations.sort_by_key(|r| r.priority.rank());
    recommendations
}
