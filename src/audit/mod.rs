//! Classification-aware architecture validation.

pub mod engine;
pub mod rules;
mod types;

pub use engine::run_audit;
pub use types::{
    AuditOutcome, AuditResult, Evidence, Severity, SourceLocation, Violation, ViolationBuilder,
};
