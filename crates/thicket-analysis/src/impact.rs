//! Change impact propagation
//!
//! A change to a node affects everything that depends on it, directly or
//! transitively. Propagation is a multi-source breadth-first search along
//! reverse edges, so every affected node is reached at its minimum distance
//! from the change and the first edge that reaches it is on a shortest path.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use thicket_core::{EdgeId, EdgeKind, GraphModel, ImpactConfig, NodeId};
use tracing::{debug, info};

use crate::error::ImpactError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeNature {
    /// The public surface changed incompatibly; every dependent must adapt.
    Breaking,
    #[default]
    Additive,
    Internal,
}

/// The nodes being changed and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub changed: Vec<NodeId>,
    #[serde(default)]
    pub nature: ChangeNature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ChangeSet {
    pub fn new<I, T>(changed: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        ChangeSet {
            changed: changed.into_iter().map(Into::into).collect(),
            nature: ChangeNature::default(),
            description: None,
        }
    }

    pub fn with_nature(mut self, nature: ChangeNature) -> Self {
        self.nature = nature;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Impact level by distance from the change, least severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ImpactLevel {
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0..=1 => ImpactLevel::Critical,
            2..=3 => ImpactLevel::High,
            4..=6 => ImpactLevel::Medium,
            _ => ImpactLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakingReason {
    /// The change itself was declared breaking.
    ChangeNature,
    /// Reached over a strong import or dependency edge.
    StrongEdge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedNode {
    pub id: NodeId,
    pub depth: usize,
    pub level: ImpactLevel,
    /// Changed node this one was reached from.
    pub source: NodeId,
    /// Edge by which the node was first reached.
    pub via_edge: EdgeId,
    /// Changed node first, this node last.
    pub propagation_path: Vec<NodeId>,
    pub breaking: bool,
    pub effort_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingChange {
    pub node: NodeId,
    pub via_edge: EdgeId,
    pub edge_kind: EdgeKind,
    pub strength: f64,
    pub reason: BreakingReason,
}

/// Suggested order for updating one breaking dependent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPath {
    pub node: NodeId,
    pub depth: usize,
    pub steps: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    pub sources: Vec<NodeId>,
    pub nature: ChangeNature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// In discovery order, which is non-decreasing depth.
    pub affected: Vec<AffectedNode>,
    pub breaking_changes: Vec<BreakingChange>,
    pub migration_paths: Vec<MigrationPath>,
    pub total_effort_hours: f64,
    pub max_depth: usize,
}

impl ImpactResult {
    pub fn get(&self, id: &NodeId) -> Option<&AffectedNode> {
        self.affected.iter().find(|a| &a.id == id)
    }

    pub fn is_affected(&self, id: &NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn level_of(&self, id: &NodeId) -> Option<ImpactLevel> {
        self.get(id).map(|a| a.level)
    }
}

pub struct ImpactPropagator {
    breaking_strength: f64,
    base_effort_hours: f64,
}

impl ImpactPropagator {
    pub fn new(config: &ImpactConfig) -> Self {
        ImpactPropagator {
            breaking_strength: config.breaking_strength,
            base_effort_hours: config.base_effort_hours,
        }
    }

    /// Estimated hours to update a node of `complexity` at `depth` from the change.
    pub fn estimate_effort(&self, complexity: f64, depth: usize) -> f64 {
        let proximity = 1.0 + 1.0 / depth.max(1) as f64;
        self.base_effort_hours * (1.0 + complexity.max(0.0)) * proximity
    }

    /// Everything that transitively depends on the changed nodes.
    ///
    /// # Errors
    ///
    /// Fails before any traversal if the change set is empty or names a node
    /// the graph does not contain.
    pub fn propagate(
        &self,
        graph: &GraphModel,
        change: &ChangeSet,
    ) -> Result<ImpactResult, ImpactError> {
        if change.changed.is_empty() {
            return Err(ImpactError::EmptyChangeSet);
        }

        let mut sources: Vec<NodeId> = Vec::new();
        let mut missing: Vec<NodeId> = Vec::new();
        for id in &change.changed {
            let bucket = if graph.contains_node(id) {
                &mut sources
            } else {
                &mut missing
            };
            if !bucket.contains(id) {
                bucket.push(id.clone());
            }
        }
        if !missing.is_empty() {
            return Err(ImpactError::UnknownNode { missing });
        }

        let mut visited: HashSet<NodeId> = sources.iter().cloned().collect();
        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        let mut queue: VecDeque<(NodeId, usize)> = sources.iter().map(|s| (s.clone(), 0)).collect();
        let mut affected: Vec<AffectedNode> = Vec::new();
        let mut breaking_changes = Vec::new();

        while let Some((current, depth)) = queue.pop_front() {
            for edge in graph.edges_to(&current) {
                let dependent = &edge.source;
                if !visited.insert(dependent.clone()) {
                    continue;
                }
                parents.insert(dependent.clone(), current.clone());
                let depth = depth + 1;
                let propagation_path = trace_path(&parents, dependent);
                let source = propagation_path
                    .first()
                    .cloned()
                    .unwrap_or_else(|| current.clone());

                let reason = if change.nature == ChangeNature::Breaking {
                    Some(BreakingReason::ChangeNature)
                } else if edge.kind.carries_breaking_changes()
                    && edge.strength > self.breaking_strength
                {
                    Some(BreakingReason::StrongEdge)
                } else {
                    None
                };
                if let Some(reason) = reason {
                    breaking_changes.push(BreakingChange {
                        node: dependent.clone(),
                        via_edge: edge.id.clone(),
                        edge_kind: edge.kind,
                        strength: edge.strength,
                        reason,
                    });
                }

                let complexity = graph
                    .node(dependent)
                    .map(|n| n.stats.complexity)
                    .unwrap_or_default();
                debug!("{} affected at depth {} via {}", dependent, depth, edge.id);

                affected.push(AffectedNode {
                    id: dependent.clone(),
                    depth,
                    level: ImpactLevel::from_depth(depth),
                    source,
                    via_edge: edge.id.clone(),
                    propagation_path,
                    breaking: reason.is_some(),
                    effort_hours: self.estimate_effort(complexity, depth),
                });
                queue.push_back((dependent.clone(), depth));
            }
        }

        // Discovery order is already non-decreasing in depth
        let migration_paths = affected
            .iter()
            .filter(|a| a.breaking)
            .map(|a| MigrationPath {
                node: a.id.clone(),
                depth: a.depth,
                steps: a.propagation_path.clone(),
            })
            .collect();

        let result = ImpactResult {
            total_effort_hours: affected.iter().fold(0.0, |acc, a| acc + a.effort_hours),
            max_depth: affected.iter().map(|a| a.depth).max().unwrap_or(0),
            sources,
            nature: change.nature,
            description: change.description.clone(),
            affected,
            breaking_changes,
            migration_paths,
        };
        info!(
            "Impact of {} change(s): {} affected, {} breaking, max depth {}",
            result.sources.len(),
            result.affected.len(),
            result.breaking_changes.len(),
            result.max_depth
        );
        Ok(result)
    }
}

impl Default for ImpactPropagator {
    fn default() -> Self {
        Self::new(&ImpactConfig::default())
    }
}

/// Walk predecessor links back to a changed node, then reverse.
fn trace_path(parents: &HashMap<NodeId, NodeId>, node: &NodeId) -> Vec<NodeId> {
    let mut path = vec![node.clone()];
    let mut current = node;
    while let Some(parent) = parents.get(current) {
        path.push(parent.clone());
        current = parent;
    }
    path.reverse();
    path
}
