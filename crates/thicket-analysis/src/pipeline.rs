//! Runs the analysis passes over a graph in order

use serde::{Deserialize, Serialize};
use thicket_core::{AnalysisConfig, GraphModel, GraphSnapshot};
use tracing::info;

use crate::cycles::{Cycle, CycleDetector};
use crate::error::ImpactError;
use crate::impact::{ChangeSet, ImpactPropagator, ImpactResult};
use crate::metrics::{GraphMetrics, MetricsCalculator};

/// Results of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub cycles: Vec<Cycle>,
    pub metrics: GraphMetrics,
}

/// Everything a renderer needs, serialized as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub graph: GraphSnapshot,
    pub cycles: Vec<Cycle>,
    pub metrics: GraphMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactResult>,
}

impl AnalysisReport {
    /// Snapshot `graph` as it stands now, so lay it out first.
    pub fn new(graph: &GraphModel, analysis: Analysis) -> Self {
        AnalysisReport {
            graph: graph.snapshot(),
            cycles: analysis.cycles,
            metrics: analysis.metrics,
            impact: None,
        }
    }

    pub fn with_impact(mut self, impact: ImpactResult) -> Self {
        self.impact = Some(impact);
        self
    }
}

pub struct Analyzer {
    detector: CycleDetector,
    calculator: MetricsCalculator,
    propagator: ImpactPropagator,
}

impl Analyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Analyzer {
            detector: CycleDetector::new(&config.cycles),
            calculator: MetricsCalculator::new(config),
            propagator: ImpactPropagator::new(&config.impact),
        }
    }

    /// Detect cycles, measure, and write the results into graph metadata.
    pub fn analyze(&self, graph: &mut GraphModel) -> Analysis {
        let cycles = self.detector.detect(graph);
        let metrics = self.calculator.compute(graph);

        let metadata = graph.metadata_mut();
        metadata.total_nodes = metrics.total_nodes;
        metadata.total_edges = metrics.total_edges;
        metadata.complexity = metrics.complexity;
        metadata.health = metrics.health;

        info!(
            "Analysis complete: {} cycle(s), complexity {:.2}, health {}",
            cycles.len(),
            metrics.complexity,
            metrics.health
        );
        Analysis { cycles, metrics }
    }

    pub fn impact(
        &self,
        graph: &GraphModel,
        change: &ChangeSet,
    ) -> Result<ImpactResult, ImpactError> {
        self.propagator.propagate(graph, change)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
