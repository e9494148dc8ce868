//! Concurrent, cancellable discovery of source files and their imports

use std::path::{Path, PathBuf};

use futures_util::{Stream, StreamExt, stream};
use thicket_core::{ArtifactKind, DiscoveryRecord, ProgressEvent, ScanSettings};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, ScanError};
use crate::extract::{Dialect, compute_stats, extract_specifiers, parse_manifest, parse_source};
use crate::walk::{PACKAGE_MANIFEST, collect_files, to_artifact_path};

pub struct Scanner {
    root: PathBuf,
    settings: ScanSettings,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>, settings: ScanSettings) -> Self {
        Scanner {
            root: root.into(),
            settings,
            progress: None,
        }
    }

    /// Report per-file progress on `tx`.
    pub fn with_progress(mut self, tx: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn concurrency(&self) -> usize {
        self.settings.max_concurrency.max(1)
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.progress {
            if tx.send(event).is_err() {
                debug!("Progress receiver dropped");
            }
        }
    }

    /// Relative paths of the files a scan would read, sorted.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        collect_files(&self.root, &self.settings)
    }

    /// Read every discovered file and return its record, sorted by path.
    ///
    /// Unreadable files are logged and skipped. Cancellation discards
    /// everything read so far.
    pub async fn scan(&self, cancel: &CancellationToken) -> Result<Vec<DiscoveryRecord>> {
        let files = self.discover()?;
        let total = files.len();
        self.emit(ProgressEvent::ScanStarted { total });

        let mut reads = std::pin::pin!(
            stream::iter(files)
                .map(|relative| self.read_record(relative))
                .buffer_unordered(self.concurrency())
        );

        let mut records = Vec::with_capacity(total);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Scan cancelled after {} file(s)", records.len());
                    return Err(ScanError::Cancelled { scanned: records.len() });
                }
                next = reads.next() => match next {
                    Some(Ok(record)) => {
                        self.emit(ProgressEvent::FileScanned {
                            path: record.artifact_path.clone(),
                            completed: records.len() + 1,
                            total,
                        });
                        records.push(record);
                    }
                    Some(Err(err)) => warn!("Skipping file: {}", err),
                    None => break,
                },
            }
        }

        records.sort_by(|a, b| a.artifact_path.cmp(&b.artifact_path));
        info!("Scanned {} file(s) under {}", records.len(), self.root.display());
        Ok(records)
    }

    /// Records for `files` as an ordered stream, read with bounded concurrency.
    ///
    /// The stream ends early once `cancel` fires. Unreadable files are
    /// logged and skipped.
    pub fn record_stream<'a>(
        &'a self,
        files: Vec<PathBuf>,
        cancel: &'a CancellationToken,
    ) -> impl Stream<Item = DiscoveryRecord> + 'a {
        let total = files.len();
        self.emit(ProgressEvent::ScanStarted { total });

        stream::iter(files)
            .map(move |relative| self.read_record(relative))
            .buffered(self.concurrency())
            .take_until(cancel.cancelled())
            .enumerate()
            .filter_map(move |(i, result)| {
                let record = match result {
                    Ok(record) => {
                        self.emit(ProgressEvent::FileScanned {
                            path: record.artifact_path.clone(),
                            completed: i + 1,
                            total,
                        });
                        Some(record)
                    }
                    Err(err) => {
                        warn!("Skipping file: {}", err);
                        None
                    }
                };
                std::future::ready(record)
            })
    }

    /// Read one file relative to the root and extract its facts.
    pub async fn read_record(&self, relative: PathBuf) -> Result<DiscoveryRecord> {
        let full = self.root.join(&relative);
        let bytes = tokio::fs::read(&full).await.map_err(|source| ScanError::Io {
            path: full.clone(),
            source,
        })?;
        let source = String::from_utf8_lossy(&bytes).into_owned();
        let artifact_path = to_artifact_path(&relative);

        let is_manifest = relative.file_name().is_some_and(|n| n == PACKAGE_MANIFEST);
        let record = if is_manifest {
            let manifest = parse_manifest(&artifact_path, &source);
            let mut record = DiscoveryRecord::new(artifact_path, manifest.dependencies);
            record.name = manifest.name;
            record.kind = Some(ArtifactKind::Package);
            record
        } else {
            let dialect = Dialect::for_path(&relative);
            let path = full.clone();
            // tree-sitter parsing blocks
            let (specifiers, stats) = tokio::task::spawn_blocking(move || {
                let tree = parse_source(&path, &source, dialect)?;
                Ok::<_, ScanError>((
                    extract_specifiers(&tree, &source),
                    compute_stats(&tree, &source),
                ))
            })
            .await
            .map_err(|err| ScanError::Parse {
                path: full.clone(),
                message: err.to_string(),
            })??;
            DiscoveryRecord::new(artifact_path, specifiers).with_stats(stats)
        };

        debug!(
            "Read {} ({} specifier(s))",
            record.artifact_path,
            record.raw_dependencies.len()
        );
        Ok(record)
    }
}
