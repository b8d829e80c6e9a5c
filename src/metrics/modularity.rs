//! Newman-Girvan modularity of the package partition.
//!
//! Treats each package as a community over the directed dependency graph.
//! Q close to 1 means dependencies stay inside packages; Q near 0 means the
//! package boundaries carry no structure.

use std::collections::BTreeMap;

use crate::model::{StructuralModel, TypeId};

use super::{Metric, MetricThreshold};

pub const MODULARITY_METRIC: &str = "architecture.modularity.q";
const MODULARITY_THRESHOLD: f64 = 0.3;

/// Directed modularity with the package partition.
///
/// For every intra-package edge `u -> v` the contribution is
/// `1 - k_out(u) * k_in(v) / m` where m is the total edge count;
/// inter-package edges contribute nothing. Q = sum of contributions / m,
/// and Q = 0 on an edgeless graph.
pub fn compute_modularity(model: &StructuralModel) -> Metric {
    let graph = model.graph();
    let m = graph.edge_count();

    if m == 0 {
        return Metric::new(
            MODULARITY_METRIC,
            0.0,
            "ratio",
            "Package modularity Q (no dependencies found)",
        );
    }

    let mut out_degree: BTreeMap<&TypeId, usize> = BTreeMap::new();
    let mut in_degree: BTreeMap<&TypeId, usize> = BTreeMap::new();
    for (from, to) in graph.edges() {
        *out_degree.entry(from).or_default() += 1;
        *in_degree.entry(to).or_default() += 1;
    }

    let m_f = m as f64;
    let mut sum = 0.0;
    for (from, to) in graph.edges() {
        if from.package() != to.package() {
            continue;
        }
        let k_out = out_degree[from] as f64;
        let k_in = in_degree[to] as f64;
        sum += 1.0 - k_out * k_in / m_f;
    }
    let q = sum / m_f;

    Metric::new(
        MODULARITY_METRIC,
        q,
        "ratio",
        format!("Package modularity Q over {m} dependency edge(s)"),
    )
    .with_threshold(MetricThreshold::less_than(MODULARITY_THRESHOLD))
}
