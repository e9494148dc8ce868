//! Circular dependency detection and classification
//!
//! Detection is an iterative depth-first search: an explicit stack of
//! `(node, next-edge)` frames replaces recursion so that deep dependency
//! chains cannot overflow the call stack. Every node is a search root at
//! most once, and a cycle found from several entry points is reported once.
//!
//! Severity and resolution strategy come from fixed lookup tables keyed on
//! cycle length, member importance and member categories. They are
//! deterministic rules, not a trained classifier.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thicket_core::{CycleConfig, EdgeId, GraphModel, Importance, NodeId};
use tracing::{debug, info};

/// How urgently a cycle should be broken, least urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStrategy {
    ExtractInterface,
    DependencyInjection,
    EventDriven,
    Facade,
    Restructure,
}

impl ResolutionStrategy {
    pub fn summary(&self) -> &'static str {
        match self {
            ResolutionStrategy::ExtractInterface => {
                "Move the shared contract into an interface both sides depend on"
            }
            ResolutionStrategy::DependencyInjection => {
                "Pass the dependency in from the outside instead of importing it"
            }
            ResolutionStrategy::EventDriven => {
                "Replace direct calls with events published by one side"
            }
            ResolutionStrategy::Facade => {
                "Route cross-category access through a single facade module"
            }
            ResolutionStrategy::Restructure => {
                "Split or merge the members so dependencies point one way"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub strategy: ResolutionStrategy,
    pub summary: String,
}

impl From<ResolutionStrategy> for Resolution {
    fn from(strategy: ResolutionStrategy) -> Self {
        Resolution {
            strategy,
            summary: strategy.summary().to_string(),
        }
    }
}

/// A closed walk through the graph. `nodes` lists each member once, in walk order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub nodes: Vec<NodeId>,
    pub length: usize,
    pub severity: Severity,
    /// Members plus the distinct outside nodes that depend on a member.
    pub impact: usize,
    /// Distinct category tags of the members, sorted.
    pub categories: Vec<String>,
    pub resolution: Resolution,
}

impl Cycle {
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains(id)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node} -> ")?;
        }
        match self.nodes.first() {
            Some(first) => write!(f, "{first}"),
            None => Ok(()),
        }
    }
}

pub struct CycleDetector {
    critical_length: usize,
}

impl CycleDetector {
    pub fn new(config: &CycleConfig) -> Self {
        CycleDetector {
            critical_length: config.critical_length,
        }
    }

    /// Detect, classify, flag circular edges, and refresh cycle metadata.
    pub fn detect(&self, graph: &mut GraphModel) -> Vec<Cycle> {
        let walks = if graph.edge_count() == 0 {
            Vec::new()
        } else {
            find_cycles(graph)
        };

        let cycles: Vec<Cycle> = walks
            .into_iter()
            .map(|members| self.classify(graph, members))
            .collect();

        let mut flagged = 0;
        for cycle in &cycles {
            for edge in cycle_edges(graph, &cycle.nodes) {
                if graph.mark_circular(&edge) {
                    flagged += 1;
                }
            }
        }

        let metadata = graph.metadata_mut();
        metadata.total_cycles = cycles.len();
        metadata.max_cycle_length = cycles.iter().map(|c| c.length).max().unwrap_or(0);
        metadata.average_cycle_length = if cycles.is_empty() {
            0.0
        } else {
            cycles.iter().map(|c| c.length).sum::<usize>() as f64 / cycles.len() as f64
        };

        info!(
            "Detected {} cycle(s), {} circular edge flag(s) set",
            cycles.len(),
            flagged
        );
        cycles
    }

    fn classify(&self, graph: &GraphModel, members: Vec<NodeId>) -> Cycle {
        let length = members.len();
        let categories: BTreeSet<String> = members
            .iter()
            .filter_map(|id| graph.node(id))
            .map(|n| n.category.clone())
            .collect();

        let mut severity = if length > self.critical_length {
            Severity::Critical
        } else if length <= 2 {
            Severity::High
        } else {
            Severity::Medium
        };
        let all_optional = members.iter().all(|id| {
            graph
                .node(id)
                .is_some_and(|n| n.importance == Importance::Optional)
        });
        if all_optional {
            severity = Severity::Low;
        }

        let strategy = if length <= 2 {
            ResolutionStrategy::ExtractInterface
        } else if categories.len() > 1 {
            ResolutionStrategy::Facade
        } else {
            ResolutionStrategy::Restructure
        };

        let member_set: HashSet<&NodeId> = members.iter().collect();
        let outside_dependents: HashSet<&NodeId> = members
            .iter()
            .flat_map(|id| graph.dependents(id))
            .filter(|d| !member_set.contains(d))
            .collect();

        let cycle = Cycle {
            length,
            severity,
            impact: length + outside_dependents.len(),
            categories: categories.into_iter().collect(),
            resolution: strategy.into(),
            nodes: members,
        };
        debug!("Cycle {} classified {:?}", cycle, cycle.severity);
        cycle
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new(&CycleConfig::default())
    }
}

/// All distinct cycles reachable by the search, as member lists in walk order.
///
/// Roots are taken in insertion order and neighbors in edge insertion order,
/// so the result is stable for an unchanged graph.
pub fn find_cycles(graph: &GraphModel) -> Vec<Vec<NodeId>> {
    let ids: Vec<&NodeId> = graph.node_ids().collect();
    let position: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let adjacency: Vec<Vec<usize>> = ids
        .iter()
        .map(|id| {
            graph
                .dependencies(id)
                .into_iter()
                .filter_map(|target| position.get(target).copied())
                .collect()
        })
        .collect();

    let mut visited = vec![false; ids.len()];
    // Position of each node on the current walk, if it is on it
    let mut on_path: Vec<Option<usize>> = vec![None; ids.len()];
    let mut path: Vec<usize> = Vec::new();
    let mut frames: Vec<(usize, usize)> = Vec::new();
    // Member sets already reported; index sets stand in for sorted id sets
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut cycles = Vec::new();

    for root in 0..ids.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        on_path[root] = Some(0);
        path.push(root);
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let Some(&target) = adjacency[node].get(next) else {
                frames.pop();
                path.pop();
                on_path[node] = None;
                continue;
            };
            frame.1 += 1;

            if let Some(start) = on_path[target] {
                let members = path[start..].to_vec();
                let mut key = members.clone();
                key.sort_unstable();
                if seen.insert(key) {
                    cycles.push(members.into_iter().map(|i| ids[i].clone()).collect());
                }
            } else if !visited[target] {
                visited[target] = true;
                on_path[target] = Some(path.len());
                path.push(target);
                frames.push((target, 0));
            }
        }
    }

    cycles
}

/// Edges joining consecutive members, including last back to first.
fn cycle_edges(graph: &GraphModel, members: &[NodeId]) -> Vec<EdgeId> {
    let mut edges = Vec::new();
    for (i, from) in members.iter().enumerate() {
        let to = &members[(i + 1) % members.len()];
        edges.extend(
            graph
                .edges_from(from)
                .into_iter()
                .filter(|e| &e.target == to)
                .map(|e| e.id.clone()),
        );
    }
    edges
}
