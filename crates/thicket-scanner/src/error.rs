use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The walker could not read the scan root.
    #[error("failed to walk the tree: {0}")]
    Walk(#[from] ignore::Error),

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("scan cancelled after {scanned} file(s)")]
    Cancelled { scanned: usize },
}

pub type Result<T> = std::result::Result<T, ScanError>;
