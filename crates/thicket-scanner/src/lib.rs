//! Reference scanner: walks a source tree and emits discovery records

pub mod error;
pub mod extract;
pub mod scanner;
pub mod walk;


pub use error::ScanError;
pub use extract::{
    Dialect, Manifest, compute_stats, extract_specifiers, parse_manifest, parse_source,
};
pub use scanner::Scanner;
pub use walk::{collect_files, to_artifact_path};
