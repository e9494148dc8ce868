//! Graph construction errors

use thiserror::Error;

use crate::model::{EdgeId, NodeId};

pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while inserting into a [`crate::GraphModel`].
///
/// Each is fatal to the single insertion only; the graph is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node '{0}' already exists")]
    DuplicateNode(NodeId),

    #[error("edge '{0}' already exists")]
    DuplicateEdge(EdgeId),

    #[error("edge '{edge}' references missing node(s): {}", join_ids(.missing))]
    DanglingEdge { edge: EdgeId, missing: Vec<NodeId> },
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter().map(NodeId::as_str).collect::<Vec<_>>().join(", ")
}
