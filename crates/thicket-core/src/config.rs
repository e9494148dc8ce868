//! Analysis configuration, loaded from `thicket.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::LayoutParams;

/// Config file looked up at the analysed root.
pub const CONFIG_FILE: &str = "thicket.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// All tunables of an analysis run. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub cycles: CycleConfig,
    pub impact: ImpactConfig,
    pub complexity: ComplexityWeights,
    pub health: HealthThresholds,
    pub metrics: MetricsConfig,
    pub layout: LayoutParams,
    pub scan: ScanSettings,
}

impl AnalysisConfig {
    /// Load `thicket.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, root.display());
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Cycles with more members than this are critical.
    pub critical_length: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        CycleConfig { critical_length: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Import/dependency edges stronger than this carry breaking changes.
    pub breaking_strength: f64,
    /// Effort for a zero-complexity node reached at infinite depth.
    pub base_effort_hours: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        ImpactConfig {
            breaking_strength: 0.7,
            base_effort_hours: 1.0,
        }
    }
}

/// Weights of the log-scaled complexity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityWeights {
    pub node_weight: f64,
    pub edge_weight: f64,
    pub cycle_weight: f64,
}

impl Default for ComplexityWeights {
    fn default() -> Self {
        ComplexityWeights {
            node_weight: 1.0,
            edge_weight: 1.0,
            cycle_weight: 5.0,
        }
    }
}

/// The health ladder. A tier applies when cycles or complexity strictly exceed its bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub critical_cycles: usize,
    pub poor_cycles: usize,
    pub poor_complexity: f64,
    pub fair_cycles: usize,
    pub fair_complexity: f64,
    pub good_cycles: usize,
    pub good_complexity: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        HealthThresholds {
            critical_cycles: 10,
            poor_cycles: 5,
            poor_complexity: 8.0,
            fair_cycles: 2,
            fair_complexity: 6.0,
            good_cycles: 0,
            good_complexity: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// How many hub nodes to report per direction.
    pub hub_limit: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig { hub_limit: 10 }
    }
}

/// Settings for the reference scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Source extensions to read, without the dot.
    pub extensions: Vec<String>,
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
    /// Extra glob patterns, matched against root-relative paths.
    pub exclude_globs: Vec<String>,
    pub max_concurrency: usize,
    /// Honour `.gitignore` files.
    pub respect_gitignore: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            extensions: ["ts", "tsx", "js", "jsx", "mjs", "cjs"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: ["node_modules", "dist", "build", "target", "coverage", ".git", ".thicket"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_globs: Vec::new(),
            max_concurrency: 16,
            respect_gitignore: true,
        }
    }
}
