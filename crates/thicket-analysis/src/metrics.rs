//! Graph-level metrics and the health rating

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thicket_core::{
    AnalysisConfig, ComplexityWeights, GraphModel, Health, HealthThresholds, NodeId,
};

/// A node ranked by how many edges touch it in one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubNode {
    pub id: NodeId,
    pub label: String,
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetrics {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Edges per node.
    pub average_degree: f64,
    /// Edge endpoints per node, ignoring direction.
    pub undirected_average_degree: f64,
    pub density: f64,
    pub clustering_coefficient: f64,
    pub connected_components: usize,
    pub strongly_connected_components: usize,
    pub cycle_count: usize,
    pub circular_edges: usize,
    pub complexity: f64,
    pub health: Health,
    /// Highest in-degree first.
    pub most_depended_upon: Vec<HubNode>,
    /// Highest out-degree first.
    pub most_dependent: Vec<HubNode>,
}

pub struct MetricsCalculator {
    weights: ComplexityWeights,
    thresholds: HealthThresholds,
    hub_limit: usize,
}

impl MetricsCalculator {
    pub fn new(config: &AnalysisConfig) -> Self {
        MetricsCalculator {
            weights: config.complexity.clone(),
            thresholds: config.health.clone(),
            hub_limit: config.metrics.hub_limit,
        }
    }

    /// Measure the graph. The cycle count is read from graph metadata, so
    /// run cycle detection first.
    pub fn compute(&self, graph: &GraphModel) -> GraphMetrics {
        let nodes = graph.node_count();
        let edges = graph.edge_count();
        let cycles = graph.metadata().total_cycles;

        let (average_degree, undirected_average_degree) = if nodes == 0 {
            (0.0, 0.0)
        } else {
            (edges as f64 / nodes as f64, 2.0 * edges as f64 / nodes as f64)
        };
        let density = if nodes > 1 {
            edges as f64 / (nodes as f64 * (nodes as f64 - 1.0))
        } else {
            0.0
        };

        let complexity = self.complexity(nodes, edges, cycles);

        GraphMetrics {
            total_nodes: nodes,
            total_edges: edges,
            average_degree,
            undirected_average_degree,
            density,
            clustering_coefficient: clustering_coefficient(graph),
            connected_components: graph.weakly_connected_components(),
            strongly_connected_components: graph.strongly_connected_components().len(),
            cycle_count: cycles,
            circular_edges: graph.edges().filter(|e| e.is_circular).count(),
            complexity,
            health: self.health(cycles, complexity),
            most_depended_upon: self.hubs(graph, |id| graph.edges_to(id).len()),
            most_dependent: self.hubs(graph, |id| graph.edges_from(id).len()),
        }
    }

    /// Log-scaled weighted size score.
    pub fn complexity(&self, nodes: usize, edges: usize, cycles: usize) -> f64 {
        let w = &self.weights;
        let raw = w.node_weight * nodes as f64
            + w.edge_weight * edges as f64
            + w.cycle_weight * cycles as f64;
        raw.max(0.0).ln_1p()
    }

    /// Walk the health ladder from worst to best.
    pub fn health(&self, cycles: usize, complexity: f64) -> Health {
        let t = &self.thresholds;
        if cycles > t.critical_cycles {
            Health::Critical
        } else if cycles > t.poor_cycles || complexity > t.poor_complexity {
            Health::Poor
        } else if cycles > t.fair_cycles || complexity > t.fair_complexity {
            Health::Fair
        } else if cycles > t.good_cycles || complexity > t.good_complexity {
            Health::Good
        } else {
            Health::Excellent
        }
    }

    fn hubs<F>(&self, graph: &GraphModel, degree: F) -> Vec<HubNode>
    where
        F: Fn(&NodeId) -> usize,
    {
        let mut hubs: Vec<HubNode> = graph
            .nodes()
            .map(|n| HubNode {
                id: n.id.clone(),
                label: n.label.clone(),
                degree: degree(&n.id),
            })
            .filter(|h| h.degree > 0)
            .collect();
        // Stable sort keeps insertion order among equal degrees
        hubs.sort_by(|a, b| b.degree.cmp(&a.degree));
        hubs.truncate(self.hub_limit);
        hubs
    }
}

impl Default for MetricsCalculator {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

/// Average local clustering over the undirected simple view, counting only
/// nodes with at least two neighbors.
fn clustering_coefficient(graph: &GraphModel) -> f64 {
    let mut neighbors: HashMap<&NodeId, HashSet<&NodeId>> =
        graph.node_ids().map(|id| (id, HashSet::new())).collect();
    for edge in graph.edges() {
        if edge.source == edge.target {
            continue;
        }
        if let Some(set) = neighbors.get_mut(&edge.source) {
            set.insert(&edge.target);
        }
        if let Some(set) = neighbors.get_mut(&edge.target) {
            set.insert(&edge.source);
        }
    }

    let mut total = 0.0;
    let mut counted = 0usize;
    for id in graph.node_ids() {
        let Some(adjacent) = neighbors.get(id) else {
            continue;
        };
        let k = adjacent.len();
        if k < 2 {
            continue;
        }
        let members: Vec<&&NodeId> = adjacent.iter().collect();
        let mut links = 0usize;
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if neighbors.get(**a).is_some_and(|set| set.contains(**b)) {
                    links += 1;
                }
            }
        }
        total += links as f64 / (k * (k - 1) / 2) as f64;
        counted += 1;
    }

    if counted == 0 { 0.0 } else { total / counted as f64 }
}
