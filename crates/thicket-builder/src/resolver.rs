//! Path conventions and import specifier resolution

use std::collections::HashMap;

use thicket_core::{ArtifactKind, ImportKind, Importance, NodeId};

use crate::error::UnresolvedReason;

/// Manifests whose directory is a package.
pub const MANIFESTS: &[&str] = &["package.json", "Cargo.toml", "pyproject.toml"];

/// Extensions tried, in order, when a specifier omits one.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "json", "rs", "py",
];

/// File stems that make a file the entry module of its directory.
const MODULE_STEMS: &[&str] = &["index", "mod", "__init__"];

/// Directories whose first child names the category.
const SOURCE_ROOTS: &[&str] = &["src", "lib", "app"];

const TEST_DIRS: &[&str] = &["__tests__", "__mocks__", "tests", "test"];
const TEST_MARKERS: &[&str] = &[".test.", ".spec.", ".stories."];

/// Normalize a path to forward slashes without `.`/empty segments.
/// Returns `None` when `..` climbs above the root.
pub fn normalize_path(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }
    Some(parts.join("/"))
}

fn file_name(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
}

/// Directory part of a normalized path, empty at the root.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

pub fn is_manifest(path: &str) -> bool {
    MANIFESTS.contains(&file_name(path))
}

/// Infer an artifact kind from path conventions alone.
pub fn infer_kind(path: &str) -> ArtifactKind {
    let name = file_name(path);
    if MANIFESTS.contains(&name) {
        return ArtifactKind::Package;
    }
    if path.ends_with('/') || path.ends_with('\\') || !name.contains('.') {
        return ArtifactKind::Directory;
    }
    let stem = name.split('.').next().unwrap_or(name);
    if MODULE_STEMS.contains(&stem) {
        ArtifactKind::Module
    } else {
        ArtifactKind::File
    }
}

/// Category tag: the directory right below a source root, else the top-level directory.
pub fn infer_category(path: &str) -> String {
    let dirs: Vec<&str> = match path.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    if let Some(pos) = dirs.iter().position(|d| SOURCE_ROOTS.contains(d)) {
        if let Some(next) = dirs.get(pos + 1) {
            return (*next).to_string();
        }
    }
    dirs.first()
        .map(|d| (*d).to_string())
        .unwrap_or_else(|| "root".to_string())
}

/// Tests and stories are optional, manifests critical, the rest important.
pub fn infer_importance(path: &str) -> Importance {
    if is_manifest(path) {
        return Importance::Critical;
    }
    let name = file_name(path);
    let in_test_dir = path
        .split('/')
        .rev()
        .skip(1)
        .any(|d| TEST_DIRS.contains(&d));
    if in_test_dir || TEST_MARKERS.iter().any(|m| name.contains(m)) {
        Importance::Optional
    } else {
        Importance::Important
    }
}

pub fn classify_specifier(specifier: &str) -> ImportKind {
    if specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
    {
        ImportKind::Relative
    } else if specifier.starts_with('/') {
        ImportKind::Absolute
    } else {
        ImportKind::Package
    }
}

/// Package name of a bare specifier: `@scope/name/x` → `@scope/name`, `lodash/fp` → `lodash`.
pub fn package_name(specifier: &str) -> Option<&str> {
    if specifier.starts_with('@') {
        let mut split = specifier.match_indices('/');
        let _scope_end = split.next()?;
        match split.next() {
            Some((end, _)) => Some(&specifier[..end]),
            None => Some(specifier),
        }
    } else {
        specifier.split('/').next().filter(|s| !s.is_empty())
    }
}

/// Lookup tables built from every staged node before any edge is resolved.
#[derive(Debug, Default)]
pub struct ResolverIndex {
    by_path: HashMap<String, NodeId>,
    packages: HashMap<String, NodeId>,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub target: NodeId,
    pub import_kind: ImportKind,
}

impl ResolverIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node reachable by path (files, modules, directories).
    pub fn insert_path(&mut self, path: String, id: NodeId) {
        self.by_path.entry(path).or_insert(id);
    }

    /// Register a package under its name.
    pub fn insert_package(&mut self, name: String, id: NodeId) {
        if let Some(existing) = self.packages.get(&name) {
            tracing::warn!("Package '{}' declared twice, keeping {}", name, existing);
            return;
        }
        self.packages.insert(name, id);
    }

    /// Resolve one specifier written in the artifact at `from_path`.
    pub fn resolve(&self, from_path: &str, specifier: &str) -> Result<Resolved, UnresolvedReason> {
        let specifier = specifier.trim();
        if specifier.is_empty() {
            return Err(UnresolvedReason::EmptySpecifier);
        }
        let import_kind = classify_specifier(specifier);
        let target = match import_kind {
            ImportKind::Relative => {
                let base = parent_dir(from_path);
                let joined = if base.is_empty() {
                    specifier.to_string()
                } else {
                    format!("{base}/{specifier}")
                };
                let normalized = normalize_path(&joined).ok_or(UnresolvedReason::EscapesRoot)?;
                self.lookup_file(&normalized)
                    .ok_or(UnresolvedReason::NoMatchingFile)?
            }
            ImportKind::Absolute => {
                let normalized =
                    normalize_path(specifier).ok_or(UnresolvedReason::EscapesRoot)?;
                self.lookup_file(&normalized)
                    .ok_or(UnresolvedReason::NoMatchingFile)?
            }
            ImportKind::Package => {
                let name = package_name(specifier).ok_or(UnresolvedReason::UnknownPackage)?;
                self.packages
                    .get(name)
                    .cloned()
                    .ok_or(UnresolvedReason::UnknownPackage)?
            }
        };
        Ok(Resolved { target, import_kind })
    }

    /// Exact path, then with extensions, then `index.*` inside a directory.
    fn lookup_file(&self, path: &str) -> Option<NodeId> {
        if let Some(id) = self.by_path.get(path) {
            return Some(id.clone());
        }
        // ESM sources import `./x.js` for `./x.ts`
        if let Some(stem) = path.strip_suffix(".js") {
            for ext in ["ts", "tsx"] {
                if let Some(id) = self.by_path.get(&format!("{stem}.{ext}")) {
                    return Some(id.clone());
                }
            }
        }
        for ext in SOURCE_EXTENSIONS {
            if let Some(id) = self.by_path.get(&format!("{path}.{ext}")) {
                return Some(id.clone());
            }
        }
        for stem in MODULE_STEMS {
            for ext in SOURCE_EXTENSIONS {
                let candidate = if path.is_empty() {
                    format!("{stem}.{ext}")
                } else {
                    format!("{path}/{stem}.{ext}")
                };
                if let Some(id) = self.by_path.get(&candidate) {
                    return Some(id.clone());
                }
            }
        }
        None
    }
}
