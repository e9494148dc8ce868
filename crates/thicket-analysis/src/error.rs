use thicket_core::NodeId;
use thiserror::Error;

/// Errors returned by impact queries. The graph is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImpactError {
    #[error("change set is empty")]
    EmptyChangeSet,

    #[error("unknown node(s) in change set: {}", join(missing))]
    UnknownNode { missing: Vec<NodeId> },
}

fn join(ids: &[NodeId]) -> String {
    ids.iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
