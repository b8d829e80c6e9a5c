//! Hexaudit - architecture audit engine.
//!
//! Hexaudit evaluates a structural model of a codebase against layered and
//! hexagonal architecture rules. It works on an immutable snapshot produced
//! by an upstream frontend: a type registry with roles and layers plus a
//! dependency graph. No parsing, no I/O.
//!
//! # Architecture
//!
//! - `model`: the read-only structural model (types, members, dependencies)
//! - `graph`: iterative cycle and SCC detection over opaque node ids
//! - `metrics`: coupling, cohesion, modularity and boundary calculators
//! - `audit`: rule registry, validators and the audit engine
//! - `recommend`: turns grouped violations into prioritized recommendations
//! - `pipeline`: the sequential analysis-plugin orchestrator and output bus
//!
//! # Adding a New Rule
//!
//! See `src/audit/rules/` for examples. Write a `check` function and add a
//! `RuleDescriptor` entry in `rules/mod.rs`.

pub mod audit;
pub mod graph;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod recommend;

pub use audit::{run_audit, AuditOutcome, AuditResult, Severity, Violation};
pub use graph::{compute_scc_mapping, find_cycles, find_strongly_connected_components, has_cycles};
pub use metrics::{compute_all as compute_metrics, Metric, MetricThreshold};
pub use model::{ArchitectureQuery, DependencyGraph, StructuralModel, StructuralUnit, TypeId};
pub use pipeline::{
    AnalysisPlugin, BusValue, OutputBus, PipelineError, PipelineExecutor, PipelineResult,
    PluginCategory, PluginContext, PluginStatus,
};
pub use recommend::{generate_recommendations, Priority, Recommendation};
