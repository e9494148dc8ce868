//! Core data structures for the dependency graph

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique, stable identifier for a node. Discovered artifacts use their normalized path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId(value)
    }
}

/// Unique edge identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Canonical id for an edge of `kind` from `source` to `target`.
    pub fn between(source: &NodeId, target: &NodeId, kind: EdgeKind) -> Self {
        EdgeId(format!("{source}->{target}:{kind}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of artifact a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    File,
    Package,
    Module,
    Directory,
    Service,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::File => "file",
            ArtifactKind::Package => "package",
            ArtifactKind::Module => "module",
            ArtifactKind::Directory => "directory",
            ArtifactKind::Service => "service",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much an artifact matters to the system it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Importance {
    Critical,
    #[default]
    Important,
    Optional,
    Excluded,
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Import,
    Export,
    Dependency,
    Inheritance,
    Composition,
    ServiceCall,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Import => "import",
            EdgeKind::Export => "export",
            EdgeKind::Dependency => "dependency",
            EdgeKind::Inheritance => "inheritance",
            EdgeKind::Composition => "composition",
            EdgeKind::ServiceCall => "service-call",
        }
    }

    /// Strength assigned to a freshly discovered edge of this kind.
    pub fn base_strength(&self) -> f64 {
        match self {
            EdgeKind::Dependency => 0.9,
            EdgeKind::Import | EdgeKind::Inheritance => 0.8,
            EdgeKind::Composition => 0.7,
            EdgeKind::ServiceCall => 0.6,
            EdgeKind::Export => 0.5,
        }
    }

    /// Whether a change can break dependents across an edge of this kind.
    pub fn carries_breaking_changes(&self) -> bool {
        matches!(self, EdgeKind::Import | EdgeKind::Dependency)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Directed,
    Undirected,
    Bidirectional,
}

/// How an import specifier was written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// `./x`, `../x`
    Relative,
    /// `react`, `@scope/pkg/sub`
    Package,
    /// `/src/x`, resolved against the tree root
    Absolute,
}

/// Structural measurements of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactStats {
    /// Size in bytes.
    pub size: u64,
    pub lines: u32,
    /// Branch-count style complexity score.
    pub complexity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    Circle,
    Square,
    Diamond,
    Hexagon,
    Triangle,
}

/// Rendering payload. Written only by the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Visual {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
}

/// A single artifact in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub path: String,
    pub kind: ArtifactKind,
    pub category: String,
    pub importance: Importance,
    #[serde(default)]
    pub stats: ArtifactStats,
    #[serde(default)]
    pub visual: Visual,
}

impl Node {
    /// Create a node labelled with the last segment of its path.
    pub fn new(id: impl Into<NodeId>, path: impl Into<String>, kind: ArtifactKind) -> Self {
        let path = path.into();
        let label = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(path.as_str())
            .to_string();
        Node {
            id: id.into(),
            label,
            path,
            kind,
            category: "root".to_string(),
            importance: Importance::default(),
            stats: ArtifactStats::default(),
            visual: Visual::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_stats(mut self, stats: ArtifactStats) -> Self {
        self.stats = stats;
        self
    }
}

/// Relationship-specific details carried by an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_kind: Option<ImportKind>,
    /// The specifier exactly as written in source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifier: Option<String>,
    pub usage_count: u32,
}

impl Default for EdgeMetadata {
    fn default() -> Self {
        EdgeMetadata {
            import_kind: None,
            specifier: None,
            usage_count: 1,
        }
    }
}

/// A directed edge. `source` depends on `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    /// In [0, 1].
    pub strength: f64,
    #[serde(default)]
    pub direction: Direction,
    /// Set by cycle detection; never cleared within a pass.
    #[serde(default)]
    pub is_circular: bool,
    #[serde(default)]
    pub metadata: EdgeMetadata,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, kind: EdgeKind) -> Self {
        let source = source.into();
        let target = target.into();
        Edge {
            id: EdgeId::between(&source, &target, kind),
            source,
            target,
            kind,
            strength: kind.base_strength(),
            direction: Direction::default(),
            is_circular: false,
            metadata: EdgeMetadata::default(),
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    pub fn with_metadata(mut self, metadata: EdgeMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Overall structural health tier, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Health {
    #[default]
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Health::Excellent => "excellent",
            Health::Good => "good",
            Health::Fair => "fair",
            Health::Poor => "poor",
            Health::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Derived graph-level figures, refreshed by the analysis passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_cycles: usize,
    pub average_cycle_length: f64,
    pub max_cycle_length: usize,
    pub complexity: f64,
    pub health: Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
    #[default]
    ForceDirected,
    Hierarchical,
    Circular,
    Grid,
}

impl LayoutAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutAlgorithm::ForceDirected => "force-directed",
            LayoutAlgorithm::Hierarchical => "hierarchical",
            LayoutAlgorithm::Circular => "circular",
            LayoutAlgorithm::Grid => "grid",
        }
    }
}

impl fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "force-directed" | "force" => Ok(LayoutAlgorithm::ForceDirected),
            "hierarchical" => Ok(LayoutAlgorithm::Hierarchical),
            "circular" => Ok(LayoutAlgorithm::Circular),
            "grid" => Ok(LayoutAlgorithm::Grid),
            other => Err(format!(
                "unknown layout '{other}', expected force-directed, hierarchical, circular or grid"
            )),
        }
    }
}

/// Canvas and algorithm parameters for laying out the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutParams {
    pub algorithm: LayoutAlgorithm,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
    /// Force-directed iterations.
    pub iterations: usize,
    /// Seed for the force-directed initial placement.
    pub seed: u64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        LayoutParams {
            algorithm: LayoutAlgorithm::default(),
            width: 1200.0,
            height: 800.0,
            center_x: 600.0,
            center_y: 400.0,
            scale: 1.0,
            iterations: 100,
            seed: 42,
        }
    }
}

/// One fact from the upstream scanner: an artifact and the specifiers it imports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRecord {
    pub artifact_path: String,
    /// Import/require specifiers exactly as written in source.
    #[serde(default)]
    pub raw_dependencies: Vec<String>,
    /// Display name; package manifests carry the package name here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ArtifactKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ArtifactStats>,
}

impl DiscoveryRecord {
    pub fn new<I, S>(artifact_path: impl Into<String>, raw_dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DiscoveryRecord {
            artifact_path: artifact_path.into(),
            raw_dependencies: raw_dependencies.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_stats(mut self, stats: ArtifactStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Progress notifications emitted during ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The scanner found `total` candidate files.
    ScanStarted { total: usize },
    /// One file was read and its dependency facts extracted.
    FileScanned { path: String, completed: usize, total: usize },
    /// One record was merged into the graph.
    RecordMerged { path: String, merged: usize },
    /// The graph is complete.
    BuildFinished { nodes: usize, edges: usize, warnings: usize },
}
