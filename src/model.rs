//! Structural model of an analyzed codebase.
//!
//! The model is produced once by an upstream language frontend and is
//! read-only from this crate's point of view: types, members, roles, layers
//! and the dependency graph are frozen for the duration of a run. Ordered
//! collections (`BTreeMap`/`BTreeSet`) are used throughout so that every
//! consumer iterates in a deterministic order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Globally unique qualified identifier of a type.
///
/// Segments are dot-separated (`shop.billing.Invoice`). `TypeId` is the
/// universal graph-node key: hashable, ordered, cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self(qualified_name.into())
    }

    /// The full dot-separated qualified name.
    pub fn qualified_name(&self) -> &str {
        &self.0
    }

    /// The last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// The qualified name without its last segment; empty for a bare name.
    pub fn package(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Whether this type lives in `package` or one of its sub-packages.
    pub fn in_package_or_below(&self, package: &str) -> bool {
        let own = self.package();
        own == package || (!package.is_empty() && own.starts_with(package) && own.as_bytes().get(package.len()) == Some(&b'.'))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Declaration kind of a structural unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Record,
    Enum,
}

/// Architectural layer assignment, decided upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Domain,
    Application,
    Infrastructure,
    Unclassified,
}

/// Architectural role assignment, decided upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    AggregateRoot,
    Entity,
    ValueObject,
    DomainService,
    DomainEvent,
    Identifier,
    DrivingPort,
    DrivenPort,
    ApplicationService,
    Adapter,
    Unclassified,
}

impl Role {
    pub fn is_port(self) -> bool {
        matches!(self, Role::DrivingPort | Role::DrivenPort)
    }
}

/// A declared field of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub type_name: String,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A declared method or constructor of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default)]
    pub is_constructor: bool,
    /// Cyclomatic complexity measured by the frontend, if available.
    #[serde(default)]
    pub complexity: Option<u32>,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameter_types: Vec::new(),
            is_constructor: false,
            complexity: None,
        }
    }

    pub fn with_parameters(mut self, parameter_types: Vec<String>) -> Self {
        self.parameter_types = parameter_types;
        self
    }

    pub fn constructor(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: String::new(),
            parameter_types: Vec::new(),
            is_constructor: true,
            complexity: None,
        }
    }
}

/// Evidence attached to a role decision by the upstream classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationTrace {
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Name of the classification rule that fired.
    pub rule: String,
    pub rationale: String,
}

/// One analyzed type: structure plus its architectural classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuralUnit {
    pub id: TypeId,
    pub kind: TypeKind,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub methods: Vec<Method>,
    pub layer: Layer,
    pub role: Role,
    #[serde(default)]
    pub trace: Option<ClassificationTrace>,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl StructuralUnit {
    pub fn new(id: impl Into<TypeId>, kind: TypeKind, layer: Layer, role: Role) -> Self {
        Self {
            id: id.into(),
            kind,
            fields: Vec::new(),
            methods: Vec::new(),
            layer,
            role,
            trace: None,
            documentation: None,
        }
    }

    /// Abstract types count toward package abstractness: interfaces, plus
    /// concrete types following the `Abstract...` / `...Base` naming
    /// convention.
    pub fn is_abstract(&self) -> bool {
        if self.kind == TypeKind::Interface {
            return true;
        }
        let name = self.id.simple_name();
        name.starts_with("Abstract") || name.ends_with("Base")
    }
}

impl From<String> for TypeId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Directed "references" edges between types, stored as an adjacency map.
///
/// Self-edges and duplicate edges are silently dropped on insert. Lookups on
/// unknown nodes return an empty out-set, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    edges: BTreeMap<TypeId, BTreeSet<TypeId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `from -> to` edge; self- and duplicate edges are no-ops.
    pub fn add_edge(&mut self, from: impl Into<TypeId>, to: impl Into<TypeId>) {
        let from = from.into();
        let to = to.into();
        if from == to {
            return;
        }
        self.edges.entry(from).or_default().insert(to);
    }

    /// Outgoing dependencies of `id`; empty for unknown nodes.
    pub fn dependencies_of(&self, id: &TypeId) -> impl Iterator<Item = &TypeId> + '_ {
        self.edges.get(id).into_iter().flatten()
    }

    /// All types with an edge into `id`. Linear in the edge count.
    pub fn dependents_of(&self, id: &TypeId) -> BTreeSet<&TypeId> {
        self.edges
            .iter()
            .filter(|(_, targets)| targets.contains(id))
            .map(|(from, _)| from)
            .collect()
    }

    pub fn has_edge(&self, from: &TypeId, to: &TypeId) -> bool {
        self.edges.get(from).is_some_and(|targets| targets.contains(to))
    }

    /// All `(from, to)` edges in deterministic order.
    pub fn edges(&self) -> impl Iterator<Item = (&TypeId, &TypeId)> + '_ {
        self.edges
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// The raw adjacency map, for the generic graph algorithms.
    pub fn adjacency(&self) -> &BTreeMap<TypeId, BTreeSet<TypeId>> {
        &self.edges
    }
}

/// Immutable per-run snapshot: type registry plus dependency adjacency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuralModel {
    units: BTreeMap<TypeId, StructuralUnit>,
    graph: DependencyGraph,
    /// Explicit implements-index (port id -> implementor ids), when the
    /// frontend resolved interface implementations.
    #[serde(default)]
    implementors: BTreeMap<TypeId, BTreeSet<TypeId>>,
}

impl StructuralModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unit(&mut self, unit: StructuralUnit) {
        self.units.insert(unit.id.clone(), unit);
    }

    pub fn add_dependency(&mut self, from: impl Into<TypeId>, to: impl Into<TypeId>) {
        self.graph.add_edge(from, to);
    }

    pub fn add_implementor(&mut self, port: impl Into<TypeId>, implementor: impl Into<TypeId>) {
        self.implementors
            .entry(port.into())
            .or_default()
            .insert(implementor.into());
    }

    pub fn unit(&self, id: &TypeId) -> Option<&StructuralUnit> {
        self.units.get(id)
    }

    pub fn units(&self) -> impl Iterator<Item = &StructuralUnit> + '_ {
        self.units.values()
    }

    pub fn type_count(&self) -> usize {
        self.units.len()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Types with the given role, in id order.
    pub fn units_with_role(&self, role: Role) -> impl Iterator<Item = &StructuralUnit> + '_ {
        self.units.values().filter(move |u| u.role == role)
    }

    /// Types in the given layer, in id order.
    pub fn units_in_layer(&self, layer: Layer) -> impl Iterator<Item = &StructuralUnit> + '_ {
        self.units.values().filter(move |u| u.layer == layer)
    }

    /// Explicitly indexed implementors of `port`, if the frontend provided
    /// an implements-index entry for it.
    pub fn indexed_implementors(&self, port: &TypeId) -> Option<&BTreeSet<TypeId>> {
        self.implementors.get(port)
    }

    pub fn has_implements_index(&self) -> bool {
        !self.implementors.is_empty()
    }

    /// Types grouped by package, in package order.
    pub fn units_by_package(&self) -> BTreeMap<&str, Vec<&StructuralUnit>> {
        let mut by_package: BTreeMap<&str, Vec<&StructuralUnit>> = BTreeMap::new();
        for unit in self.units.values() {
            by_package.entry(unit.id.package()).or_default().push(unit);
        }
        by_package
    }
}

/// Read-only query handle over a richer graph than the snapshot carries.
///
/// Implemented by the (out-of-scope) frontend; validators fall back to it
/// when the explicit implements-index cannot answer a question.
pub trait ArchitectureQuery {
    /// All known implementors of the given port interface.
    fn find_implementors(&self, port: &TypeId) -> Vec<TypeId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_parts() {
        let id = TypeId::new("shop.billing.Invoice");
        assert_eq!(id.simple_name(), "Invoice");
        assert_eq!(id.package(), "shop.billing");

        let bare = TypeId::new("Invoice");
        assert_eq!(bare.simple_name(), "Invoice");
        assert_eq!(bare.package(), "");
    }

    #[test]
    fn test_in_package_or_below() {
        let id = TypeId::new("shop.billing.items.LineItem");
        assert!(id.in_package_or_below("shop.billing.items"));
        assert!(id.in_package_or_below("shop.billing"));
        assert!(!id.in_package_or_below("shop.bill"));
        assert!(!id.in_package_or_below("shop.shipping"));
    }

    #[test]
    fn test_graph_ignores_self_and_duplicate_edges() {
        let mut graph = DependencyGraph::new();
        graph.add_edge("a.X", "a.X");
        graph.add_edge("a.X", "a.Y");
        graph.add_edge("a.X", "a.Y");

        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(&TypeId::new("a.X"), &TypeId::new("a.Y")));
        assert!(!graph.has_edge(&TypeId::new("a.X"), &TypeId::new("a.X")));
    }

    #[test]
    fn test_graph_unknown_node_is_empty() {
        let graph = DependencyGraph::new();
        let unknown = TypeId::new("a.Missing");
        assert_eq!(graph.dependencies_of(&unknown).count(), 0);
        assert!(graph.dependents_of(&unknown).is_empty());
    }

    #[test]
    fn test_abstractness_convention() {
        let iface = StructuralUnit::new("a.Repo", TypeKind::Interface, Layer::Domain, Role::DrivenPort);
        let abstract_class =
            StructuralUnit::new("a.AbstractMapper", TypeKind::Class, Layer::Infrastructure, Role::Adapter);
        let base_class = StructuralUnit::new("a.MapperBase", TypeKind::Class, Layer::Infrastructure, Role::Adapter);
        let concrete = StructuralUnit::new("a.Mapper", TypeKind::Class, Layer::Infrastructure, Role::Adapter);

        assert!(iface.is_abstract());
        assert!(abstract_class.is_abstract());
        assert!(base_class.is_abstract());
        assert!(!concrete.is_abstract());
    }
}
