//! Read-only graph snapshot handed to renderers

use crate::error::Result;
use crate::graph::GraphModel;
use crate::model::{Edge, GraphMetadata, LayoutParams, Node};
use serde::{Deserialize, Serialize};

/// Everything a renderer needs, with no further graph logic required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub metadata: GraphMetadata,
    #[serde(default)]
    pub layout: LayoutParams,
}

impl GraphModel {
    /// Copy the graph out in insertion order.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
            metadata: self.metadata().clone(),
            layout: self.layout().clone(),
        }
    }

    /// Rebuild a model from a snapshot, keeping order and every `is_circular` flag.
    ///
    /// Edge strengths are clamped into [0, 1].
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<GraphModel> {
        let mut graph = GraphModel::new();
        for node in snapshot.nodes {
            graph.add_node(node)?;
        }
        for mut edge in snapshot.edges {
            edge.strength = edge.strength.clamp(0.0, 1.0);
            graph.add_edge(edge)?;
        }
        let mut metadata = snapshot.metadata;
        metadata.total_nodes = graph.node_count();
        metadata.total_edges = graph.edge_count();
        *graph.metadata_mut() = metadata;
        graph.set_layout(snapshot.layout);
        Ok(graph)
    }
}
