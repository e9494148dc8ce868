//! Cycle detection, impact propagation, and graph metrics

pub mod cycles;
pub mod error;
pub mod impact;
pub mod metrics;
pub mod pipeline;

#[cfg(test)]
pub mod tests;

pub use cycles::{Cycle, CycleDetector, Resolution, ResolutionStrategy, Severity, find_cycles};
pub use error::ImpactError;
pub use impact::{
    AffectedNode, BreakingChange, BreakingReason, ChangeNature, ChangeSet, ImpactLevel,
    ImpactPropagator, ImpactResult, MigrationPath,
};
pub use metrics::{GraphMetrics, HubNode, MetricsCalculator};
pub use pipeline::{Analysis, AnalysisReport, Analyzer};
