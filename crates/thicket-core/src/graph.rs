//! Graph wrapper using petgraph::StableDiGraph with string NodeId/EdgeId side maps

use crate::error::{GraphError, Result};
use crate::model::*;
use petgraph::Direction as PetDirection;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{EdgeRef, NodeIndexable};
use std::collections::{HashMap, HashSet};

/// The dependency graph: a directed multigraph with stable node/edge indices.
///
/// Node and edge payloads live in the petgraph arena; lookups by id go through
/// side maps so adjacency queries stay O(1) in the number of nodes.
pub struct GraphModel {
    inner: StableDiGraph<Node, Edge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    metadata: GraphMetadata,
    layout: LayoutParams,
}

impl std::fmt::Debug for GraphModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphModel")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .field("health", &self.metadata.health)
            .finish()
    }
}

impl GraphModel {
    pub fn new() -> Self {
        GraphModel {
            inner: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            metadata: GraphMetadata::default(),
            layout: LayoutParams::default(),
        }
    }

    /// Add a node. Fails if a node with the same id exists.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        if self.node_index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.node_index.insert(id.clone(), idx);
        self.metadata.total_nodes = self.inner.node_count();
        Ok(id)
    }

    /// Add an edge. Both endpoints must already exist and the id must be new.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId> {
        let source = self.node_index.get(&edge.source).copied();
        let target = self.node_index.get(&edge.target).copied();
        let (Some(source), Some(target)) = (source, target) else {
            let mut missing = Vec::new();
            if source.is_none() {
                missing.push(edge.source.clone());
            }
            if target.is_none() && edge.target != edge.source {
                missing.push(edge.target.clone());
            }
            return Err(GraphError::DanglingEdge {
                edge: edge.id,
                missing,
            });
        };
        if self.edge_index.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        let id = edge.id.clone();
        let idx = self.inner.add_edge(source, target, edge);
        self.edge_index.insert(id.clone(), idx);
        self.metadata.total_edges = self.inner.edge_count();
        Ok(id)
    }

    /// Get a node by ID.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    /// Mutable access to a node's visual payload. Kind and path stay immutable.
    pub fn visual_mut(&mut self, id: &NodeId) -> Option<&mut Visual> {
        let idx = *self.node_index.get(id)?;
        self.inner.node_weight_mut(idx).map(|n| &mut n.visual)
    }

    /// Get an edge by ID.
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edge_index
            .get(id)
            .and_then(|&idx| self.inner.edge_weight(idx))
    }

    /// Flag an edge as participating in a cycle. Returns false if the edge is unknown.
    pub fn mark_circular(&mut self, id: &EdgeId) -> bool {
        let Some(&idx) = self.edge_index.get(id) else {
            return false;
        };
        match self.inner.edge_weight_mut(idx) {
            Some(edge) => {
                edge.is_circular = true;
                true
            }
            None => false,
        }
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes().map(|n| &n.id)
    }

    /// Iterate over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Outgoing edges of a node (what it depends on), in insertion order.
    pub fn edges_from(&self, source: &NodeId) -> Vec<&Edge> {
        self.directed_edges(source, PetDirection::Outgoing)
    }

    /// Incoming edges of a node (what depends on it), in insertion order.
    pub fn edges_to(&self, target: &NodeId) -> Vec<&Edge> {
        self.directed_edges(target, PetDirection::Incoming)
    }

    fn directed_edges(&self, id: &NodeId, dir: PetDirection) -> Vec<&Edge> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        // petgraph yields adjacency lists newest-first
        let mut edges: Vec<(EdgeIndex, &Edge)> = self
            .inner
            .edges_directed(idx, dir)
            .map(|e| (e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(eidx, _)| eidx.index());
        edges.into_iter().map(|(_, e)| e).collect()
    }

    /// Distinct nodes this node depends on.
    pub fn dependencies(&self, id: &NodeId) -> Vec<&NodeId> {
        let mut seen = HashSet::new();
        self.edges_from(id)
            .into_iter()
            .map(|e| &e.target)
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Distinct nodes that depend on this node.
    pub fn dependents(&self, id: &NodeId) -> Vec<&NodeId> {
        let mut seen = HashSet::new();
        self.edges_to(id)
            .into_iter()
            .map(|e| &e.source)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Check if an edge exists between two nodes of a specific kind.
    pub fn has_edge_between(&self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> bool {
        self.edges_from(source)
            .iter()
            .any(|e| &e.target == target && e.kind == kind)
    }

    /// Number of components when edge direction is ignored.
    pub fn weakly_connected_components(&self) -> usize {
        if self.inner.node_count() == 0 {
            return 0;
        }
        let mut sets = UnionFind::new(self.inner.node_bound());
        for eidx in self.inner.edge_indices() {
            if let Some((source, target)) = self.inner.edge_endpoints(eidx) {
                sets.union(source.index(), target.index());
            }
        }
        self.inner
            .node_indices()
            .map(|idx| sets.find(idx.index()))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Strongly connected components, each listed by node id.
    pub fn strongly_connected_components(&self) -> Vec<Vec<NodeId>> {
        petgraph::algo::kosaraju_scc(&self.inner)
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .filter_map(|idx| self.inner.node_weight(idx).map(|n| n.id.clone()))
                    .collect()
            })
            .collect()
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut GraphMetadata {
        &mut self.metadata
    }

    pub fn layout(&self) -> &LayoutParams {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: LayoutParams) {
        self.layout = layout;
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}
