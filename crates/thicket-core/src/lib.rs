//! Thicket Core — Dependency graph model, configuration, and snapshot cache

pub mod model;
pub mod error;
pub mod graph;
pub mod snapshot;
pub mod config;
pub mod cache;


#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use model::{
    NodeId, EdgeId, ArtifactKind, Importance, EdgeKind, Direction, ImportKind, ArtifactStats,
    Shape, Visual, Node, EdgeMetadata, Edge, Health, GraphMetadata, LayoutAlgorithm,
    LayoutParams, DiscoveryRecord, ProgressEvent,
};
pub use error::GraphError;
pub use graph::GraphModel;
pub use snapshot::GraphSnapshot;
pub use config::{
    AnalysisConfig, ConfigError, CycleConfig, ImpactConfig, ComplexityWeights, HealthThresholds,
    MetricsConfig, ScanSettings, CONFIG_FILE,
};
pub use cache::{CACHE_DIR, SNAPSHOT_CACHE, cache_dir, snapshot_cache_path, ensure_cache_dir, save_snapshot, load_snapshot, clear_cache};
