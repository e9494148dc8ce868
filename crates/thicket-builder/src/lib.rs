//! Graph construction from scanner records

pub mod builder;
pub mod error;
pub mod ingest;
pub mod resolver;

#[cfg(test)]
pub mod tests;

pub use builder::{BuildOutput, GraphBuilder};
pub use error::{BuildError, ResolutionWarning, UnresolvedReason};
pub use resolver::{ResolverIndex, infer_category, infer_importance, infer_kind, normalize_path};
