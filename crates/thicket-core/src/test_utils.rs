//! Fixture builders for Thicket tests

use std::fs;

use tempfile::TempDir;

use crate::graph::GraphModel;
use crate::model::{ArtifactKind, Edge, EdgeKind, Node, NodeId};

/// A plain file node whose id, path and label derive from `id`.
pub fn file_node(id: &str) -> Node {
    Node::new(id, id, ArtifactKind::File)
}

/// Build a graph with the given isolated nodes.
pub fn graph_with_nodes(ids: &[&str]) -> GraphModel {
    let mut graph = GraphModel::new();
    for id in ids {
        graph.add_node(file_node(id)).unwrap();
    }
    graph
}

/// Build a graph of import edges. Nodes are created in first-appearance order.
pub fn graph_from_edges(edges: &[(&str, &str)]) -> GraphModel {
    let mut graph = GraphModel::new();
    for (source, target) in edges {
        for id in [source, target] {
            if !graph.contains_node(&NodeId::from(*id)) {
                graph.add_node(file_node(id)).unwrap();
            }
        }
        graph
            .add_edge(Edge::new(*source, *target, EdgeKind::Import))
            .unwrap();
    }
    graph
}

/// Add extra import edges to an existing graph, creating missing nodes.
pub fn add_edges(graph: &mut GraphModel, edges: &[(&str, &str)]) {
    for (source, target) in edges {
        for id in [source, target] {
            if !graph.contains_node(&NodeId::from(*id)) {
                graph.add_node(file_node(id)).unwrap();
            }
        }
        graph
            .add_edge(Edge::new(*source, *target, EdgeKind::Import))
            .unwrap();
    }
}

/// Create a repository with a specific file structure
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);

        // Create parent directories if needed
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}
