//! Build errors and soft resolution warnings

use std::fmt;

use serde::Serialize;
use thicket_core::{GraphError, NodeId};
use thiserror::Error;

/// Errors that abort a build. Resolution problems never do.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The caller cancelled ingestion before the record stream ended.
    #[error("ingestion cancelled after {merged} record(s)")]
    Cancelled { merged: usize },
}

/// Why a specifier could not be turned into an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedReason {
    EmptySpecifier,
    /// A relative or absolute path matched no known file.
    NoMatchingFile,
    /// `..` climbed above the tree root.
    EscapesRoot,
    /// A bare specifier named no known package.
    UnknownPackage,
    /// The graph refused the edge.
    Rejected(String),
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::EmptySpecifier => f.write_str("empty specifier"),
            UnresolvedReason::NoMatchingFile => f.write_str("no matching file"),
            UnresolvedReason::EscapesRoot => f.write_str("path escapes the tree root"),
            UnresolvedReason::UnknownPackage => f.write_str("unknown package"),
            UnresolvedReason::Rejected(err) => write!(f, "rejected by graph: {err}"),
        }
    }
}

impl From<GraphError> for UnresolvedReason {
    fn from(err: GraphError) -> Self {
        UnresolvedReason::Rejected(err.to_string())
    }
}

/// A specifier that was dropped instead of becoming a dangling edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionWarning {
    pub artifact: NodeId,
    pub specifier: String,
    pub reason: UnresolvedReason,
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: cannot resolve '{}' ({})",
            self.artifact, self.specifier, self.reason
        )
    }
}
