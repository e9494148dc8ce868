//! On-disk cache of the last analysed graph

use crate::graph::GraphModel;
use crate::snapshot::GraphSnapshot;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cache directory: .thicket/
pub const CACHE_DIR: &str = ".thicket";

/// Snapshot cache file
pub const SNAPSHOT_CACHE: &str = "snapshot.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedSnapshot {
    version: String,
    generated_at: String,
    snapshot: GraphSnapshot,
}

/// Get cache directory path
pub fn cache_dir(root: &Path) -> PathBuf {
    root.join(CACHE_DIR)
}

/// Get snapshot cache file path
pub fn snapshot_cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_DIR).join(SNAPSHOT_CACHE)
}

/// Ensure cache directory exists
pub fn ensure_cache_dir(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if !cache.exists() {
        std::fs::create_dir_all(&cache)?;
    }
    Ok(())
}

/// Write the graph snapshot to `.thicket/snapshot.json`.
pub fn save_snapshot(graph: &GraphModel, root: &Path) -> anyhow::Result<PathBuf> {
    ensure_cache_dir(root)
        .with_context(|| format!("creating cache directory in {}", root.display()))?;
    let path = snapshot_cache_path(root);

    let cached = CachedSnapshot {
        version: env!("CARGO_PKG_VERSION").to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        snapshot: graph.snapshot(),
    };

    let json_str = serde_json::to_string_pretty(&cached)?;
    std::fs::write(&path, json_str)
        .with_context(|| format!("writing {}", path.display()))?;

    tracing::debug!("Graph snapshot saved: {}", path.display());
    Ok(path)
}

/// Load the cached graph, or `None` when nothing has been cached yet.
pub fn load_snapshot(root: &Path) -> anyhow::Result<Option<GraphModel>> {
    let path = snapshot_cache_path(root);
    if !path.exists() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let cached: CachedSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    if cached.version != env!("CARGO_PKG_VERSION") {
        tracing::warn!(
            "Snapshot cache written by v{}, ignoring it",
            cached.version
        );
        return Ok(None);
    }

    tracing::debug!("Loaded snapshot generated at {}", cached.generated_at);
    let graph = GraphModel::from_snapshot(cached.snapshot)?;
    Ok(Some(graph))
}

/// Remove the cache directory
pub fn clear_cache(root: &Path) -> std::io::Result<()> {
    let cache = cache_dir(root);
    if cache.exists() {
        std::fs::remove_dir_all(&cache)?;
    }
    Ok(())
}
