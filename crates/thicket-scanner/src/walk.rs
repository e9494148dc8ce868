//! File discovery with ignore rules

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use thicket_core::ScanSettings;
use tracing::{debug, info, warn};

use crate::error::{Result, ScanError};

pub const PACKAGE_MANIFEST: &str = "package.json";

pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| ScanError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ScanError::InvalidGlob {
        pattern: patterns.join(", "),
        source,
    })
}

/// Relative paths of every source file and manifest under `root`, sorted.
pub fn collect_files(root: &Path, settings: &ScanSettings) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(ScanError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let excludes = build_globset(&settings.exclude_globs)?;
    let extensions: HashSet<&str> = settings.extensions.iter().map(String::as_str).collect();
    let exclude_dirs: HashSet<String> = settings.exclude_dirs.iter().cloned().collect();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(settings.respect_gitignore)
        .git_exclude(settings.respect_gitignore)
        .git_global(false)
        .ignore(settings.respect_gitignore)
        .require_git(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry.depth() > 0
                && exclude_dirs.contains(entry.file_name().to_string_lossy().as_ref()))
        });

    let mut files = Vec::new();
    let mut walked = 0usize;
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            // The root is always yielded first
            Err(err) if walked == 0 => return Err(err.into()),
            Err(err) => {
                warn!("Walker error: {}", err);
                continue;
            }
        };
        walked += 1;

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if excludes.is_match(relative) {
            debug!("Excluded by pattern: {}", relative.display());
            continue;
        }

        let is_manifest = relative.file_name().is_some_and(|n| n == PACKAGE_MANIFEST);
        let has_extension = relative
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(e));
        if is_manifest || has_extension {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    info!(
        "File collection complete: {} entries walked, {} files kept",
        walked,
        files.len()
    );
    Ok(files)
}

/// Forward-slash form of a relative path.
pub fn to_artifact_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
