//! Streaming ingestion with cooperative cancellation

use futures_util::{Stream, StreamExt};
use thicket_core::DiscoveryRecord;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::builder::{BuildOutput, GraphBuilder};
use crate::error::BuildError;

impl GraphBuilder {
    /// Merge records from an async source until it ends, then resolve.
    ///
    /// Records are merged one at a time on the calling task. If `cancel`
    /// fires first, no graph is produced.
    pub async fn ingest<S>(
        mut self,
        records: S,
        cancel: &CancellationToken,
    ) -> Result<BuildOutput, BuildError>
    where
        S: Stream<Item = DiscoveryRecord>,
    {
        let mut records = std::pin::pin!(records);
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Ingestion cancelled after {} record(s)", self.merged());
                    return Err(BuildError::Cancelled { merged: self.merged() });
                }
                next = records.next() => match next {
                    Some(record) => self.add_record(record),
                    None => break,
                },
            }
        }
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use thicket_core::ProgressEvent;

    #[tokio::test]
    async fn test_ingest_stream() {
        let records = stream::iter(vec![
            DiscoveryRecord::new("src/a.ts", ["./b"]),
            DiscoveryRecord::new("src/b.ts", Vec::<String>::new()),
        ]);
        let cancel = CancellationToken::new();

        let output = GraphBuilder::new().ingest(records, &cancel).await.unwrap();
        assert_eq!(output.graph.node_count(), 2);
        assert_eq!(output.graph.edge_count(), 1);
        assert!(output.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_ingest_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let records = stream::pending::<DiscoveryRecord>();

        let result = GraphBuilder::new().ingest(records, &cancel).await;
        assert!(matches!(result, Err(BuildError::Cancelled { merged: 0 })));
    }

    #[tokio::test]
    async fn test_ingest_with_closed_progress_channel() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let records = stream::iter(vec![
            DiscoveryRecord::new("a.ts", ["./b"]),
            DiscoveryRecord::new("b.ts", Vec::<String>::new()),
        ]);
        let cancel = CancellationToken::new();

        let output = GraphBuilder::new()
            .with_progress(tx)
            .ingest(records, &cancel)
            .await
            .unwrap();
        assert_eq!(output.graph.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_ingest_reports_progress() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let records = stream::iter(vec![
            DiscoveryRecord::new("a.ts", ["./b"]),
            DiscoveryRecord::new("b.ts", Vec::<String>::new()),
        ]);
        let cancel = CancellationToken::new();

        GraphBuilder::new()
            .with_progress(tx)
            .ingest(records, &cancel)
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 3);
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::BuildFinished {
                nodes: 2,
                edges: 1,
                warnings: 0
            })
        );
    }
}
