//! The dependency graph.
//!
//! Wraps a petgraph `DiGraph` whose nodes are type-level element handles and
//! whose edges carry a usage count. A side index keyed by
//! (source, target, kind) keeps at most one edge per triple.

use crate::edge::{Edge, EdgeKind, GraphEdge};
use crate::error::GraphError;
use crate::index::StructuralIndex;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use squid_core::ElementId;
use std::collections::{HashMap, HashSet};

/// Handle to an edge in the graph.
pub type EdgeId = EdgeIndex;

/// Directed, counted dependencies between types.
///
/// Edges are never removed, so edge handles grow with insertion order and
/// every listing below is returned in insertion order.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<ElementId, Edge>,

    /// Element handle to graph node.
    vertex_index: HashMap<ElementId, NodeIndex>,

    /// One edge per (source, target, kind).
    edge_index: HashMap<(ElementId, ElementId, EdgeKind), EdgeId>,
}

impl DependencyGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a dependency between the types `source` and `target`.
    ///
    /// Returns `Ok(None)` for a self-dependency, which is never stored.
    /// Endpoints missing from the index are registered as external
    /// placeholders first.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotAType`] when an endpoint is registered as a
    /// non-type element.
    pub fn add_edge(
        &mut self,
        index: &mut StructuralIndex,
        source: &str,
        target: &str,
        kind: EdgeKind,
    ) -> Result<Option<EdgeId>, GraphError> {
        if source == target {
            return Ok(None);
        }
        let source = self.resolve_vertex(index, source)?;
        let target = self.resolve_vertex(index, target)?;
        Ok(self.connect(source, target, kind))
    }

    /// Adds a vertex for an element. Returns its graph node.
    pub fn add_vertex(&mut self, id: ElementId) -> NodeIndex {
        if let Some(&node) = self.vertex_index.get(&id) {
            return node;
        }
        let node = self.graph.add_node(id);
        self.vertex_index.insert(id, node);
        node
    }

    /// Adds a vertex for every type-level element of the index.
    pub fn add_type_vertices(&mut self, index: &StructuralIndex) {
        let ids: Vec<ElementId> = index
            .iter()
            .filter(|e| e.kind.is_type_level())
            .map(|e| e.id)
            .collect();
        for id in ids {
            self.add_vertex(id);
        }
    }

    /// Returns true if any edge leads from `source` to `target`.
    pub fn has_edge(&self, source: ElementId, target: ElementId) -> bool {
        match (self.node(source), self.node(target)) {
            (Some(a), Some(b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Gets the edge of one kind between two vertices.
    pub fn get_edge(&self, source: ElementId, target: ElementId, kind: EdgeKind) -> Option<&Edge> {
        self.edge_index
            .get(&(source, target, kind))
            .and_then(|&edge| self.graph.edge_weight(edge))
    }

    /// Gets every edge from `source` to `target`.
    pub fn edges_between(&self, source: ElementId, target: ElementId) -> Vec<&Edge> {
        let (Some(a), Some(b)) = (self.node(source), self.node(target)) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_connecting(a, b)
            .map(|e| (e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    /// Gets the edges leaving a vertex.
    pub fn outgoing(&self, vertex: ElementId) -> Vec<&Edge> {
        self.directed(vertex, Direction::Outgoing)
    }

    /// Gets the edges entering a vertex.
    pub fn incoming(&self, vertex: ElementId) -> Vec<&Edge> {
        self.directed(vertex, Direction::Incoming)
    }

    /// Gets every edge with at least one endpoint in `vertices`.
    pub fn edges_touching(&self, vertices: &[ElementId]) -> Vec<&Edge> {
        let wanted: HashSet<ElementId> = vertices.iter().copied().collect();
        self.edges()
            .filter(|e| wanted.contains(&e.source) || wanted.contains(&e.target))
            .collect()
    }

    /// Returns all vertices in insertion order.
    pub fn vertices(&self) -> Vec<ElementId> {
        self.graph.node_weights().copied().collect()
    }

    pub fn contains_vertex(&self, id: ElementId) -> bool {
        self.vertex_index.contains_key(&id)
    }

    /// Iterates over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Returns all edges with endpoint keys for export.
    pub fn export_edges(&self, index: &StructuralIndex) -> Vec<GraphEdge> {
        self.edges()
            .filter_map(|edge| {
                Some(GraphEdge {
                    source: index.key_of(edge.source)?.to_string(),
                    target: index.key_of(edge.target)?.to_string(),
                    kind: edge.kind,
                    usage: edge.usage,
                })
            })
            .collect()
    }

    /// Returns the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn node(&self, id: ElementId) -> Option<NodeIndex> {
        self.vertex_index.get(&id).copied()
    }

    fn resolve_vertex(
        &mut self,
        index: &mut StructuralIndex,
        key: &str,
    ) -> Result<ElementId, GraphError> {
        let id = match index.find(key) {
            Some(element) if element.kind.is_type_level() => element.id,
            Some(element) => {
                return Err(GraphError::NotAType {
                    key: key.to_string(),
                    kind: element.kind,
                })
            }
            None => index.register_external(key),
        };
        self.add_vertex(id);
        Ok(id)
    }

    fn connect(&mut self, source: ElementId, target: ElementId, kind: EdgeKind) -> Option<EdgeId> {
        if source == target {
            return None;
        }
        if let Some(&edge) = self.edge_index.get(&(source, target, kind)) {
            if let Some(weight) = self.graph.edge_weight_mut(edge) {
                weight.usage += 1;
            }
            return Some(edge);
        }
        let a = self.add_vertex(source);
        let b = self.add_vertex(target);
        let edge = self.graph.add_edge(a, b, Edge::new(source, target, kind));
        self.edge_index.insert((source, target, kind), edge);
        Some(edge)
    }

    fn directed(&self, vertex: ElementId, direction: Direction) -> Vec<&Edge> {
        let Some(node) = self.node(vertex) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, direction)
            .map(|e| (e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, edge)| edge).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squid_core::ElementKind;

    fn index_with_types(keys: &[&str]) -> StructuralIndex {
        let mut index = StructuralIndex::new();
        for key in keys {
            index.register(key, ElementKind::Type, None).unwrap();
        }
        index
    }

    #[test]
    fn test_empty_graph() {
        let graph = DependencyGraph::new();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.outgoing(ElementId::new(0)).is_empty());
        assert!(!graph.has_edge(ElementId::new(0), ElementId::new(1)));
    }

    #[test]
    fn test_edge_multiplicity() {
        let mut index = index_with_types(&["a/A", "a/B"]);
        let mut graph = DependencyGraph::new();

        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(
                graph
                    .add_edge(&mut index, "a/B", "a/A", EdgeKind::Calls)
                    .unwrap(),
            );
        }

        assert_eq!(graph.edge_count(), 1);
        assert!(ids.windows(2).all(|w| w[0] == w[1]));

        let a = index.id_of("a/A").unwrap();
        let b = index.id_of("a/B").unwrap();
        assert_eq!(graph.get_edge(b, a, EdgeKind::Calls).unwrap().usage, 5);
        assert!(graph.get_edge(a, b, EdgeKind::Calls).is_none());
    }

    #[test]
    fn test_no_self_edges() {
        let mut index = index_with_types(&["a/A"]);
        let mut graph = DependencyGraph::new();

        for kind in [EdgeKind::Calls, EdgeKind::Extends, EdgeKind::ReferencesField] {
            assert_eq!(graph.add_edge(&mut index, "a/A", "a/A", kind), Ok(None));
        }

        let a = index.id_of("a/A").unwrap();
        assert!(!graph.has_edge(a, a));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_distinct_kinds_are_distinct_edges() {
        let mut index = index_with_types(&["a/A", "a/B"]);
        let mut graph = DependencyGraph::new();
        graph
            .add_edge(&mut index, "a/B", "a/A", EdgeKind::Extends)
            .unwrap();
        graph
            .add_edge(&mut index, "a/B", "a/A", EdgeKind::Calls)
            .unwrap();

        let a = index.id_of("a/A").unwrap();
        let b = index.id_of("a/B").unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge(b, a));
        assert!(!graph.has_edge(a, b));

        let kinds: Vec<EdgeKind> = graph.edges_between(b, a).iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EdgeKind::Extends, EdgeKind::Calls]);
    }

    #[test]
    fn test_unknown_target_becomes_external() {
        let mut index = index_with_types(&["a/A"]);
        let mut graph = DependencyGraph::new();

        graph
            .add_edge(&mut index, "a/A", "lib/Lib", EdgeKind::Calls)
            .unwrap();
        graph
            .add_edge(&mut index, "a/A", "lib/Lib", EdgeKind::ReferencesField)
            .unwrap();

        let externals = index.query(ElementKind::External);
        assert_eq!(externals.len(), 1);
        assert_eq!(externals[0].key, "lib/Lib");
        assert!(externals[0].children.is_empty());
        assert!(graph.contains_vertex(externals[0].id));
    }

    #[test]
    fn test_non_type_endpoint_rejected() {
        let mut index = index_with_types(&["a/A"]);
        index
            .register("a/A#run()V", ElementKind::Method, Some("a/A"))
            .unwrap();
        let mut graph = DependencyGraph::new();

        let err = graph
            .add_edge(&mut index, "a/A#run()V", "a/A", EdgeKind::Calls)
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::NotAType {
                key: "a/A#run()V".to_string(),
                kind: ElementKind::Method,
            }
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_insertion_order() {
        let mut index = index_with_types(&["a/A", "a/B", "a/C", "a/D"]);
        let mut graph = DependencyGraph::new();
        graph.add_edge(&mut index, "a/A", "a/C", EdgeKind::Calls).unwrap();
        graph.add_edge(&mut index, "a/A", "a/B", EdgeKind::Calls).unwrap();
        graph.add_edge(&mut index, "a/D", "a/B", EdgeKind::Calls).unwrap();
        graph.add_edge(&mut index, "a/A", "a/D", EdgeKind::Extends).unwrap();
        graph.add_edge(&mut index, "a/C", "a/B", EdgeKind::Calls).unwrap();

        let key = |id: ElementId| index.key_of(id).unwrap().to_string();
        let a = index.id_of("a/A").unwrap();
        let b = index.id_of("a/B").unwrap();

        let targets: Vec<String> = graph.outgoing(a).iter().map(|e| key(e.target)).collect();
        assert_eq!(targets, vec!["a/C", "a/B", "a/D"]);

        let sources: Vec<String> = graph.incoming(b).iter().map(|e| key(e.source)).collect();
        assert_eq!(sources, vec!["a/A", "a/D", "a/C"]);

        let vertices: Vec<String> = graph.vertices().into_iter().map(key).collect();
        assert_eq!(vertices, vec!["a/A", "a/C", "a/B", "a/D"]);
    }

    #[test]
    fn test_edges_touching() {
        let mut index = index_with_types(&["a/A", "a/B", "a/C", "a/D"]);
        let mut graph = DependencyGraph::new();
        graph.add_edge(&mut index, "a/A", "a/B", EdgeKind::Calls).unwrap();
        graph.add_edge(&mut index, "a/C", "a/D", EdgeKind::Calls).unwrap();
        graph.add_edge(&mut index, "a/B", "a/C", EdgeKind::Calls).unwrap();

        let b = index.id_of("a/B").unwrap();
        let c = index.id_of("a/C").unwrap();
        let touching = graph.edges_touching(&[b, c]);
        assert_eq!(touching.len(), 3);

        let a = index.id_of("a/A").unwrap();
        assert_eq!(graph.edges_touching(&[a]).len(), 1);
        assert!(graph.edges_touching(&[]).is_empty());
    }

    #[test]
    fn test_type_vertices_and_export() {
        let mut index = index_with_types(&["a/A", "a/B"]);
        index
            .register("a/A#run()V", ElementKind::Method, Some("a/A"))
            .unwrap();
        let mut graph = DependencyGraph::new();
        graph.add_type_vertices(&index);
        assert_eq!(graph.vertex_count(), 2);

        graph.add_edge(&mut index, "a/B", "a/A", EdgeKind::Implements).unwrap();
        let exported = graph.export_edges(&index);
        assert_eq!(
            exported,
            vec![GraphEdge {
                source: "a/B".to_string(),
                target: "a/A".to_string(),
                kind: EdgeKind::Implements,
                usage: 1,
            }]
        );
        assert_eq!(graph.vertex_count(), 2);
    }
}
