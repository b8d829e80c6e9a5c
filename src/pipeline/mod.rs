//! Analysis-plugin orchestration.
//!
//! Plugins are registered statically, ordered with Kahn's algorithm over
//! their declared dependencies and executed strictly one at a time, so a
//! later plugin always observes the bus writes of an earlier one. A plugin
//! failure never aborts its siblings; it only skips its dependents.

mod bus;
mod diagnostics;

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::model::{ArchitectureQuery, StructuralModel};

pub use bus::{BusError, BusValue, OutputBus};
pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticsCollector};

/// Coarse plugin grouping used for run-time filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginCategory {
    Analysis,
    Validation,
    Reporting,
    Export,
}

/// A named in-memory artifact produced by a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub payload: serde_json::Value,
}

/// One analysis step.
pub trait AnalysisPlugin {
    /// Stable unique id, referenced by `depends_on` of other plugins.
    fn id(&self) -> &str;

    fn category(&self) -> PluginCategory;

    /// Ids of plugins that must have succeeded before this one runs.
    fn depends_on(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn execute(&self, ctx: &mut PluginContext<'_>) -> anyhow::Result<()>;
}

/// Everything a plugin may touch while executing: optional read-only model
/// and query handles, write access to its own bus namespace, read access to
/// every namespace, an isolated diagnostics collector and an artifact sink.
pub struct PluginContext<'a> {
    plugin_id: &'a str,
    model: Option<&'a StructuralModel>,
    query: Option<&'a dyn ArchitectureQuery>,
    bus: &'a OutputBus,
    pub diagnostics: DiagnosticsCollector,
    artifacts: Vec<Artifact>,
}

impl<'a> PluginContext<'a> {
    pub fn model(&self) -> Option<&'a StructuralModel> {
        self.model
    }

    pub fn query(&self) -> Option<&'a dyn ArchitectureQuery> {
        self.query
    }

    /// Publishes a value under this plugin's own namespace.
    pub fn write_output(&self, key: &str, value: BusValue) {
        self.bus.write(self.plugin_id, key, value);
    }

    pub fn read_output(&self, plugin: &str, key: &str) -> Option<BusValue> {
        self.bus.read(plugin, key)
    }

    pub fn read_bool(&self, plugin: &str, key: &str) -> Result<bool, BusError> {
        self.bus.read_bool(plugin, key)
    }

    pub fn read_int(&self, plugin: &str, key: &str) -> Result<i64, BusError> {
        self.bus.read_int(plugin, key)
    }

    pub fn read_float(&self, plugin: &str, key: &str) -> Result<f64, BusError> {
        self.bus.read_float(plugin, key)
    }

    pub fn read_text(&self, plugin: &str, key: &str) -> Result<String, BusError> {
        self.bus.read_text(plugin, key)
    }

    pub fn read_json(&self, plugin: &str, key: &str) -> Result<serde_json::Value, BusError> {
        self.bus.read_json(plugin, key)
    }

    pub fn add_artifact(&mut self, name: impl Into<String>, payload: serde_json::Value) {
        self.artifacts.push(Artifact {
            name: name.into(),
            payload,
        });
    }
}

/// Terminal state of one plugin within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state")]
pub enum PluginStatus {
    Success,
    Failed,
    Skipped { reason: String },
}

/// Everything recorded about one plugin execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginRunReport {
    pub plugin_id: String,
    pub status: PluginStatus,
    pub artifacts: Vec<Artifact>,
    pub diagnostics: Vec<Diagnostic>,
    pub elapsed: Duration,
    /// Root failure message when status is Failed.
    #[serde(default)]
    pub failure: Option<String>,
    /// Bus values the plugin had published when it finished (or failed).
    pub outputs: BTreeMap<String, BusValue>,
}

/// Ordered per-plugin outcomes of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub reports: Vec<PluginRunReport>,
}

impl PipelineResult {
    pub fn report(&self, plugin_id: &str) -> Option<&PluginRunReport> {
        self.reports.iter().find(|r| r.plugin_id == plugin_id)
    }

    pub fn all_succeeded(&self) -> bool {
        self.reports
            .iter()
            .all(|r| r.status == PluginStatus::Success)
    }
}

/// Configuration errors that abort a run before any plugin executes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("plugin '{plugin}' depends on unknown plugin '{dependency}'")]
    UnknownDependency { plugin: String, dependency: String },
    #[error("cyclic plugin dependencies involving: {}", involved.join(", "))]
    CyclicDependency { involved: Vec<String> },
}

/// Statically assembled plugin list with category filtering.
#[derive(Default)]
pub struct PipelineExecutor {
    plugins: Vec<Box<dyn AnalysisPlugin>>,
    enabled_categories: Option<BTreeSet<PluginCategory>>,
}

impl PipelineExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, plugin: Box<dyn AnalysisPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Restricts the run to the given categories; unset means all.
    pub fn enable_categories(mut self, categories: impl IntoIterator<Item = PluginCategory>) -> Self {
        self.enabled_categories = Some(categories.into_iter().collect());
        self
    }

    /// Runs every enabled plugin in dependency order.
    ///
    /// Configuration problems (unknown or cyclic dependencies) return `Err`
    /// before anything executes; per-plugin failures are recorded in the
    /// result instead.
    pub fn run(
        &self,
        model: Option<&StructuralModel>,
        query: Option<&dyn ArchitectureQuery>,
    ) -> Result<PipelineResult, PipelineError> {
        let enabled: Vec<&dyn AnalysisPlugin> = self
            .plugins
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| {
                self.enabled_categories
                    .as_ref()
                    .map(|cats| cats.contains(&p.category()))
                    .unwrap_or(true)
            })
            .collect();

        let order = topological_order(&enabled)?;
        info!(plugins = order.len(), "starting plugin pipeline");

        let bus = OutputBus::new();
        let mut unavailable: BTreeSet<String> = BTreeSet::new();
        let mut reports = Vec::with_capacity(order.len());

        for idx in order {
            let plugin = enabled[idx];
            let id = plugin.id().to_string();

            let blocked = plugin
                .depends_on()
                .iter()
                .any(|dep| unavailable.contains(dep));
            if blocked {
                warn!(plugin = %id, "skipped: dependency failed");
                unavailable.insert(id.clone());
                reports.push(PluginRunReport {
                    plugin_id: id,
                    status: PluginStatus::Skipped {
                        reason: "dependency failed".to_string(),
                    },
                    artifacts: Vec::new(),
                    diagnostics: Vec::new(),
                    elapsed: Duration::ZERO,
                    failure: None,
                    outputs: BTreeMap::new(),
                });
                continue;
            }

            let mut ctx = PluginContext {
                plugin_id: plugin.id(),
                model,
                query,
                bus: &bus,
                diagnostics: DiagnosticsCollector::new(),
                artifacts: Vec::new(),
            };

            let started = Instant::now();
            let outcome = plugin.execute(&mut ctx);
            let elapsed = started.elapsed();

            let (status, failure) = match outcome {
                Ok(()) => {
                    info!(plugin = %id, ?elapsed, "plugin succeeded");
                    (PluginStatus::Success, None)
                }
                Err(err) => {
                    let cause = format!("{err:#}");
                    error!(plugin = %id, %cause, "plugin failed");
                    ctx.diagnostics
                        .error_with_cause(format!("plugin '{id}' failed"), cause.clone());
                    unavailable.insert(id.clone());
                    (PluginStatus::Failed, Some(cause))
                }
            };

            reports.push(PluginRunReport {
                outputs: bus.snapshot_of(&id),
                plugin_id: id,
                status,
                artifacts: ctx.artifacts,
                diagnostics: ctx.diagnostics.into_entries(),
                elapsed,
                failure,
            });
        }

        Ok(PipelineResult { reports })
    }
}

/// Kahn's algorithm over the enabled plugins, stable by registration order.
/// Unknown dependency ids and cycles are caller bugs and abort the run.
fn topological_order(plugins: &[&dyn AnalysisPlugin]) -> Result<Vec<usize>, PipelineError> {
    let index_of: BTreeMap<&str, usize> = plugins
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.id(), idx))
        .collect();

    let mut indegree = vec![0usize; plugins.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); plugins.len()];
    for (idx, plugin) in plugins.iter().enumerate() {
        for dep in plugin.depends_on() {
            let dep_idx = *index_of
                .get(dep.as_str())
                .ok_or_else(|| PipelineError::UnknownDependency {
                    plugin: plugin.id().to_string(),
                    dependency: dep.clone(),
                })?;
            indegree[idx] += 1;
            dependents[dep_idx].push(idx);
        }
    }

    let mut order = Vec::with_capacity(plugins.len());
    let mut emitted = vec![false; plugins.len()];
    loop {
        // First ready plugin in registration order keeps runs deterministic.
        let next = (0..plugins.len()).find(|&idx| !emitted[idx] && indegree[idx] == 0);
        let Some(idx) = next else { break };
        emitted[idx] = true;
        order.push(idx);
        for &dependent in &dependents[idx] {
            indegree[dependent] -= 1;
        }
    }

    if order.len() != plugins.len() {
        let involved = plugins
            .iter()
            .enumerate()
            .filter(|(idx, _)| !emitted[*idx])
            .map(|(_, p)| p.id().to_string())
            .collect();
        return Err(PipelineError::CyclicDependency { involved });
    }

    Ok(order)
}
