//! Turns scanner records into a validated dependency graph
//!
//! Building happens in two phases so that forward references resolve:
//! records are staged as nodes as they arrive, and every specifier is
//! resolved only once all nodes are known. The builder is the single
//! writer of the graph it produces.

use std::collections::HashMap;

use thicket_core::{
    ArtifactKind, DiscoveryRecord, Edge, EdgeId, EdgeKind, EdgeMetadata, GraphModel, Node, NodeId,
    ProgressEvent,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::error::{ResolutionWarning, UnresolvedReason};
use crate::resolver::{
    ResolverIndex, infer_category, infer_importance, infer_kind, is_manifest, normalize_path,
    parent_dir,
};

/// Strength added per repeated use of the same dependency in one artifact.
const USAGE_BONUS: f64 = 0.05;

/// Id used for a package manifest sitting at the tree root.
const ROOT_PACKAGE: &str = ".";

/// A populated graph plus everything that could not be turned into an edge.
#[derive(Debug)]
pub struct BuildOutput {
    pub graph: GraphModel,
    pub warnings: Vec<ResolutionWarning>,
}

struct StagedNode {
    node: Node,
    /// Path of the first record for this node; relative specifiers resolve against it.
    origin: String,
    package_name: Option<String>,
    raw_dependencies: Vec<String>,
}

/// Accumulates discovery records and produces a [`BuildOutput`].
pub struct GraphBuilder {
    staged: Vec<StagedNode>,
    positions: HashMap<NodeId, usize>,
    progress: Option<UnboundedSender<ProgressEvent>>,
    merged: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder {
            staged: Vec::new(),
            positions: HashMap::new(),
            progress: None,
            merged: 0,
        }
    }

    /// Report merge progress on `tx`.
    pub fn with_progress(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Build a graph from an in-memory sequence of records.
    pub fn build<I>(records: I) -> BuildOutput
    where
        I: IntoIterator<Item = DiscoveryRecord>,
    {
        let mut builder = GraphBuilder::new();
        for record in records {
            builder.add_record(record);
        }
        builder.finish()
    }

    /// Records merged so far.
    pub fn merged(&self) -> usize {
        self.merged
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress {
            if tx.send(event).is_err() {
                debug!("Progress receiver dropped");
            }
        }
    }

    /// Stage one record, creating its node or merging into an existing one.
    pub fn add_record(&mut self, record: DiscoveryRecord) {
        let Some(path) = normalize_path(&record.artifact_path) else {
            warn!("Skipping record outside the tree root: {}", record.artifact_path);
            return;
        };

        let kind = record
            .kind
            .unwrap_or_else(|| infer_kind(&record.artifact_path));
        let node_path = if kind == ArtifactKind::Package && is_manifest(&path) {
            match parent_dir(&path) {
                "" => ROOT_PACKAGE.to_string(),
                dir => dir.to_string(),
            }
        } else {
            path.clone()
        };
        if node_path.is_empty() {
            warn!("Skipping record with empty path");
            return;
        }

        let id = NodeId::new(node_path.clone());
        match self.positions.get(&id) {
            Some(&pos) => {
                debug!("Merging repeated record into {}", id);
                let staged = &mut self.staged[pos];
                staged.raw_dependencies.extend(record.raw_dependencies);
                if let Some(name) = record.name {
                    staged.node.label = name.clone();
                    staged.package_name = Some(name);
                }
                if let Some(category) = record.category {
                    staged.node.category = category;
                }
                if let Some(importance) = record.importance {
                    staged.node.importance = importance;
                }
                if let Some(stats) = record.stats {
                    staged.node.stats = stats;
                }
            }
            None => {
                let category = record
                    .category
                    .unwrap_or_else(|| infer_category(&node_path));
                let importance = record
                    .importance
                    .unwrap_or_else(|| infer_importance(&path));
                let node = Node::new(id.clone(), node_path.clone(), kind)
                    .with_category(category)
                    .with_importance(importance)
                    .with_stats(record.stats.unwrap_or_default());
                let node = match &record.name {
                    Some(name) => node.with_label(name.clone()),
                    None => node,
                };
                let package_name = match kind {
                    ArtifactKind::Package => Some(record.name.unwrap_or_else(|| node.label.clone())),
                    _ => None,
                };

                self.positions.insert(id, self.staged.len());
                self.staged.push(StagedNode {
                    node,
                    origin: path.clone(),
                    package_name,
                    raw_dependencies: record.raw_dependencies,
                });
            }
        }

        self.merged += 1;
        self.emit(ProgressEvent::RecordMerged {
            path,
            merged: self.merged,
        });
    }

    /// Insert all staged nodes, resolve every specifier, and insert the edges.
    pub fn finish(self) -> BuildOutput {
        let progress = self.progress;
        let mut graph = GraphModel::new();
        let mut index = ResolverIndex::new();
        let mut warnings = Vec::new();
        let mut pending = Vec::with_capacity(self.staged.len());

        for staged in self.staged {
            let id = staged.node.id.clone();
            if let Some(name) = staged.package_name {
                index.insert_package(name, id.clone());
            }
            index.insert_path(staged.node.path.clone(), id.clone());

            match graph.add_node(staged.node) {
                Ok(_) => pending.push((id, staged.origin, staged.raw_dependencies)),
                Err(err) => warn!("Skipping node: {}", err),
            }
        }

        let mut edges: Vec<Edge> = Vec::new();
        let mut edge_positions: HashMap<EdgeId, usize> = HashMap::new();

        for (source, origin, raw_dependencies) in pending {
            for specifier in raw_dependencies {
                let resolved = match index.resolve(&origin, &specifier) {
                    Ok(resolved) => resolved,
                    Err(reason) => {
                        warn!("{}: cannot resolve '{}' ({})", source, specifier, reason);
                        warnings.push(ResolutionWarning {
                            artifact: source.clone(),
                            specifier,
                            reason,
                        });
                        continue;
                    }
                };
                if resolved.target == source {
                    debug!("{} imports itself via '{}', skipping", source, specifier);
                    continue;
                }

                let kind = match graph.node(&resolved.target).map(|n| n.kind) {
                    Some(ArtifactKind::Package) => EdgeKind::Dependency,
                    _ => EdgeKind::Import,
                };
                let edge_id = EdgeId::between(&source, &resolved.target, kind);
                match edge_positions.get(&edge_id) {
                    Some(&pos) => {
                        let edge = &mut edges[pos];
                        edge.metadata.usage_count += 1;
                        let bonus = USAGE_BONUS * f64::from(edge.metadata.usage_count - 1);
                        edge.strength = (kind.base_strength() + bonus).min(1.0);
                    }
                    None => {
                        edge_positions.insert(edge_id, edges.len());
                        edges.push(
                            Edge::new(source.clone(), resolved.target, kind).with_metadata(
                                EdgeMetadata {
                                    import_kind: Some(resolved.import_kind),
                                    specifier: Some(specifier),
                                    usage_count: 1,
                                },
                            ),
                        );
                    }
                }
            }
        }

        for edge in edges {
            let artifact = edge.source.clone();
            let specifier = edge.metadata.specifier.clone().unwrap_or_default();
            if let Err(err) = graph.add_edge(edge) {
                warn!("Skipping edge: {}", err);
                warnings.push(ResolutionWarning {
                    artifact,
                    specifier,
                    reason: UnresolvedReason::from(err),
                });
            }
        }

        info!(
            "Built graph: {} nodes, {} edges, {} unresolved specifier(s)",
            graph.node_count(),
            graph.edge_count(),
            warnings.len()
        );
        let finished = ProgressEvent::BuildFinished {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            warnings: warnings.len(),
        };
        if let Some(tx) = &progress {
            if tx.send(finished).is_err() {
                debug!("Progress receiver dropped");
            }
        }

        BuildOutput { graph, warnings }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
