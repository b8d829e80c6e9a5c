//! LCOM4 cohesion over a method-affinity graph.
//!
//! Methods and constructors are graph nodes. Two methods are connected when
//! they (are estimated to) share a field, or when they share a non-common
//! parameter/return type; constructors connect to every method. LCOM4 is the
//! number of connected components: 1 means the type is cohesive, higher
//! values suggest it bundles unrelated responsibilities.
//!
//! Field access is estimated from structure alone (accessor naming and
//! field-type matches), since the model carries no method bodies.

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::model::{Method, Role, StructuralModel, StructuralUnit};

use super::{Metric, MetricThreshold};

pub const COHESION_METRIC: &str = "aggregate.cohesion.lcom4";
const COHESION_THRESHOLD: f64 = 2.0;

/// Types too ubiquitous to signal a shared responsibility.
const COMMON_TYPES: &[&str] = &[
    "", "void", "unit", "bool", "boolean", "byte", "char", "short", "int", "long", "float",
    "double", "string", "object",
];

fn is_common_type(type_name: &str) -> bool {
    let simple = type_name.rsplit('.').next().unwrap_or(type_name);
    COMMON_TYPES.iter().any(|c| simple.eq_ignore_ascii_case(c))
}

/// Union-find over dense method indices.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
    components: usize,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
            components: size,
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression.
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
        self.components -= 1;
    }
}

/// Fields a method is estimated to touch: accessor-name matches plus fields
/// whose type appears as a non-common parameter or return type. Constructors
/// are handled separately (they touch everything).
fn estimated_fields<'a>(method: &Method, unit: &'a StructuralUnit) -> BTreeSet<&'a str> {
    let mut touched = BTreeSet::new();

    if let Some(accessed) = accessor_target(&method.name) {
        for field in &unit.fields {
            if field.name.eq_ignore_ascii_case(&accessed) {
                touched.insert(field.name.as_str());
            }
        }
    }

    let mut match_type = |type_name: &str| {
        if is_common_type(type_name) {
            return;
        }
        for field in &unit.fields {
            if field.type_name == type_name {
                touched.insert(field.name.as_str());
            }
        }
    };
    match_type(&method.return_type);
    for param in &method.parameter_types {
        match_type(param);
    }

    touched
}

/// `getName`/`setName`/`isActive` style accessors name their field directly.
fn accessor_target(method_name: &str) -> Option<String> {
    let stem = method_name
        .strip_prefix("get")
        .or_else(|| method_name.strip_prefix("set"))
        .or_else(|| method_name.strip_prefix("is"))?;
    let stem = stem.strip_prefix('_').unwrap_or(stem);
    if stem.is_empty() {
        return None;
    }
    let mut chars = stem.chars();
    let first = chars.next().unwrap();
    Some(first.to_lowercase().chain(chars).collect())
}

/// Non-common types a method exchanges with the outside.
fn signature_types(method: &Method) -> BTreeSet<&str> {
    method
        .parameter_types
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(method.return_type.as_str()))
        .filter(|t| !is_common_type(t))
        .collect()
}

/// LCOM4 for a single type. Types with no fields or no methods default to 1.
pub fn lcom4(unit: &StructuralUnit) -> usize {
    if unit.methods.is_empty() || unit.fields.is_empty() {
        return 1;
    }

    let methods = &unit.methods;
    let fields: Vec<BTreeSet<&str>> = methods.iter().map(|m| estimated_fields(m, unit)).collect();
    let signatures: Vec<BTreeSet<&str>> = methods.iter().map(signature_types).collect();

    let mut uf = UnionFind::new(methods.len());
    for i in 0..methods.len() {
        for j in (i + 1)..methods.len() {
            let connected = methods[i].is_constructor
                || methods[j].is_constructor
                || !fields[i].is_disjoint(&fields[j])
                || !signatures[i].is_disjoint(&signatures[j]);
            if connected {
                uf.union(i, j);
            }
        }
    }

    uf.components
}

/// Mean LCOM4 across aggregate roots.
///
/// Aggregation is a plain arithmetic mean, so the parallel map is
/// order-independent. No aggregates (or none with both methods and fields)
/// defaults to a cohesive 1.0.
pub fn compute_aggregate_cohesion(model: &StructuralModel) -> Metric {
    let aggregates: Vec<&StructuralUnit> = model.units_with_role(Role::AggregateRoot).collect();

    if aggregates.is_empty() {
        return Metric::new(
            COHESION_METRIC,
            1.0,
            "components",
            "Mean LCOM4 cohesion of aggregate roots (no aggregates found)",
        );
    }

    let total: usize = aggregates.par_iter().map(|unit| lcom4(unit)).sum();
    let mean = total as f64 / aggregates.len() as f64;

    Metric::new(
        COHESION_METRIC,
        mean,
        "components",
        format!("Mean LCOM4 cohesion across {} aggregate root(s)", aggregates.len()),
    )
    .with_threshold(MetricThreshold::greater_than(COHESION_THRESHOLD))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, Layer, TypeKind};

    fn aggregate(id: &str) -> StructuralUnit {
        StructuralUnit::new(id, TypeKind::Class, Layer::Domain, Role::AggregateRoot)
    }

    #[test]
    fn test_lcom4_defaults_to_one_without_members() {
        let empty = aggregate("shop.Order");
        assert_eq!(lcom4(&empty), 1);

        let mut only_fields = aggregate("shop.Order");
        only_fields.fields.push(Field::new("total", "shop.Money"));
        assert_eq!(lcom4(&only_fields), 1);

        let mut only_methods = aggregate("shop.Order");
        only_methods.methods.push(Method::new("total", "shop.Money"));
        assert_eq!(lcom4(&only_methods), 1);
    }

    #[test]
    fn test_accessor_pair_is_cohesive() {
        let mut unit = aggregate("shop.Order");
        unit.fields.push(Field::new("total", "shop.Money"));
        unit.methods.push(Method::new("getTotal", "shop.Money"));
        unit.methods
            .push(Method::new("setTotal", "void").with_parameters(vec!["shop.Money".into()]));

        assert_eq!(lcom4(&unit), 1);
    }

    #[test]
    fn test_disjoint_responsibilities_split_components() {
        let mut unit = aggregate("shop.Order");
        unit.fields.push(Field::new("total", "shop.Money"));
        unit.fields.push(Field::new("shipping", "shop.Address"));
        unit.methods.push(Method::new("getTotal", "shop.Money"));
        unit.methods.push(Method::new("getShipping", "shop.Address"));

        assert_eq!(lcom4(&unit), 2);
    }

    #[test]
    fn test_constructor_connects_everything() {
        let mut unit = aggregate("shop.Order");
        unit.fields.push(Field::new("total", "shop.Money"));
        unit.fields.push(Field::new("shipping", "shop.Address"));
        unit.methods.push(Method::constructor("Order"));
        unit.methods.push(Method::new("getTotal", "shop.Money"));
        unit.methods.push(Method::new("getShipping", "shop.Address"));

        assert_eq!(lcom4(&unit), 1);
    }

    #[test]
    fn test_transitive_sharing_collapses_to_one_component() {
        // Three methods on the same field produce three pairwise links; the
        // redundant third must not drive the component count below one.
        let mut unit = aggregate("shop.Order");
        unit.fields.push(Field::new("total", "shop.Money"));
        unit.methods.push(Method::new("getTotal", "shop.Money"));
        unit.methods
            .push(Method::new("setTotal", "void").with_parameters(vec!["shop.Money".into()]));
        unit.methods.push(Method::new("isTotal", "boolean"));

        assert_eq!(lcom4(&unit), 1);
    }

    #[test]
    fn test_common_types_do_not_connect() {
        let mut unit = aggregate("shop.Order");
        unit.fields.push(Field::new("count", "int"));
        unit.fields.push(Field::new("label", "String"));
        unit.methods.push(Method::new("alpha", "int"));
        unit.methods.push(Method::new("beta", "String"));

        // int/String are too common to imply shared state.
        assert_eq!(lcom4(&unit), 2);
    }

    #[test]
    fn test_mean_cohesion_metric() {
        let mut model = StructuralModel::new();

        let mut cohesive = aggregate("shop.Order");
        cohesive.fields.push(Field::new("total", "shop.Money"));
        cohesive.methods.push(Method::new("getTotal", "shop.Money"));
        model.add_unit(cohesive);

        let mut split = aggregate("shop.Customer");
        split.fields.push(Field::new("name", "shop.Name"));
        split.fields.push(Field::new("address", "shop.Address"));
        split.methods.push(Method::new("getName", "shop.Name"));
        split.methods.push(Method::new("getAddress", "shop.Address"));
        model.add_unit(split);

        let metric = compute_aggregate_cohesion(&model);
        assert_eq!(metric.value, 1.5);
        assert!(!metric.exceeds_threshold());
    }

    #[test]
    fn test_no_aggregates_defaults_to_one() {
        let metric = compute_aggregate_cohesion(&StructuralModel::new());
        assert_eq!(metric.value, 1.0);
        assert!(metric.description.contains("no aggregates"));
    }
}
