//! Core types for audit results.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metrics::Metric;
use crate::model::TypeId;

/// Severity levels for violations, totally ordered: Blocker is the worst,
/// Info the mildest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
}

impl Severity {
    fn rank(self) -> u8 {
        match self {
            Severity::Blocker => 4,
            Severity::Critical => 3,
            Severity::Major => 2,
            Severity::Minor => 1,
            Severity::Info => 0,
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Blocker => write!(f, "blocker"),
            Severity::Critical => write!(f, "critical"),
            Severity::Major => write!(f, "major"),
            Severity::Minor => write!(f, "minor"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blocker" => Ok(Severity::Blocker),
            "critical" => Ok(Severity::Critical),
            "major" => Ok(Severity::Major),
            "minor" => Ok(Severity::Minor),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Typed evidence attached to a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Evidence {
    /// A dependency edge that substantiates the finding.
    Dependency {
        from: TypeId,
        to: TypeId,
        category: String,
    },
    /// A member-level observation (a method name, a signature shape).
    Behavioral { method: String, detail: String },
}

/// Where a violation was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub type_id: TypeId,
    #[serde(default)]
    pub member: Option<String>,
}

impl SourceLocation {
    pub fn of_type(type_id: impl Into<TypeId>) -> Self {
        Self {
            type_id: type_id.into(),
            member: None,
        }
    }

    pub fn of_member(type_id: impl Into<TypeId>, member: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            member: Some(member.into()),
        }
    }
}

/// A single rule finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub constraint_id: String,
    pub severity: Severity,
    pub message: String,
    /// Ordered list of the types this finding concerns.
    pub affected_types: Vec<TypeId>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl Violation {
    pub fn builder(constraint_id: impl Into<String>, severity: Severity) -> ViolationBuilder {
        ViolationBuilder {
            constraint_id: constraint_id.into(),
            severity,
            message: String::new(),
            affected_types: Vec::new(),
            evidence: Vec::new(),
            location: None,
        }
    }
}

/// Builder for uniform violation construction across rules.
pub struct ViolationBuilder {
    constraint_id: String,
    severity: Severity,
    message: String,
    affected_types: Vec<TypeId>,
    evidence: Vec<Evidence>,
    location: Option<SourceLocation>,
}

impl ViolationBuilder {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn affected(mut self, type_id: impl Into<TypeId>) -> Self {
        self.affected_types.push(type_id.into());
        self
    }

    pub fn evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    pub fn location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn build(self) -> Violation {
        Violation {
            constraint_id: self.constraint_id,
            severity: self.severity,
            message: self.message,
            affected_types: self.affected_types,
            evidence: self.evidence,
            location: self.location,
        }
    }
}

/// Overall audit verdict. Fail means violations were found, which is a
/// different condition from an orchestration error (those are `Err`s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOutcome {
    Pass,
    Fail,
}

/// Complete audit output: ordered violations plus the computed metric set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub violations: Vec<Violation>,
    pub metrics: BTreeMap<String, Metric>,
    pub outcome: AuditOutcome,
}

impl AuditResult {
    pub fn is_pass(&self) -> bool {
        self.outcome == AuditOutcome::Pass
    }

    /// Violations at or above the given severity.
    pub fn violations_at_least(&self, severity: Severity) -> impl Iterator<Item = &Violation> + '_ {
        self.violations.iter().filter(move |v| v.severity >= severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Blocker > Severity::Critical);
        assert!(Severity::Critical > Severity::Major);
        assert!(Severity::Major > Severity::Minor);
        assert!(Severity::Minor > Severity::Info);
    }

    #[test]
    fn test_severity_round_trip() {
        for severity in [
            Severity::Blocker,
            Severity::Critical,
            Severity::Major,
            Severity::Minor,
            Severity::Info,
        ] {
            let parsed: Severity = severity.to_string().parse().unwrap();
            assert_eq!(parsed, severity);
        }
        assert!("catastrophic".parse::<Severity>().is_err());
    }

    #[test]
    fn test_builder_collects_all_parts() {
        let violation = Violation::builder("ddd:domain-purity", Severity::Critical)
            .message("domain type leans on infrastructure")
            .affected("shop.Order")
            .evidence(Evidence::Dependency {
                from: TypeId::new("shop.Order"),
                to: TypeId::new("javax.persistence.Entity"),
                category: "persistence".into(),
            })
            .location(SourceLocation::of_type("shop.Order"))
            .build();

        assert_eq!(violation.constraint_id, "ddd:domain-purity");
        assert_eq!(violation.affected_types.len(), 1);
        assert_eq!(violation.evidence.len(), 1);
        assert!(violation.location.is_some());
    }
}
