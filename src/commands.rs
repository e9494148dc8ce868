//! CLI command implementations

use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thicket_analysis::{AnalysisReport, Analyzer, ChangeNature, ChangeSet};
use thicket_builder::{BuildOutput, GraphBuilder, normalize_path};
use thicket_core::{AnalysisConfig, LayoutAlgorithm, NodeId, ProgressEvent};
use thicket_layout::{EdgeStyle, LayoutEngine, edge_styles, style_nodes};
use thicket_scanner::Scanner;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The analysis report plus edge styling, as printed by `analyze`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderedReport<'a> {
    #[serde(flatten)]
    report: &'a AnalysisReport,
    edge_styles: Vec<EdgeStyle>,
}

pub async fn analyze(
    root: PathBuf,
    layout: Option<LayoutAlgorithm>,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = AnalysisConfig::load(&root)?;
    let mut graph = build_graph(&root, &config).await?.graph;
    let analysis = Analyzer::new(&config).analyze(&mut graph);

    let mut params = config.layout.clone();
    if let Some(algorithm) = layout {
        params.algorithm = algorithm;
    }
    if let Some(seed) = seed {
        params.seed = seed;
    }
    style_nodes(&mut graph);
    LayoutEngine::new(params).apply(&mut graph);

    let path = thicket_core::save_snapshot(&graph, &root)?;
    tracing::info!("Snapshot cached at {}", path.display());

    let report = AnalysisReport::new(&graph, analysis);
    let rendered = RenderedReport {
        report: &report,
        edge_styles: edge_styles(&graph),
    };
    write_json(&rendered, output.as_deref())
}

pub async fn cycles(root: PathBuf) -> anyhow::Result<()> {
    let config = AnalysisConfig::load(&root)?;
    let mut graph = build_graph(&root, &config).await?.graph;
    let analysis = Analyzer::new(&config).analyze(&mut graph);

    for cycle in &analysis.cycles {
        tracing::info!("[{:?}] {}", cycle.severity, cycle);
    }
    write_json(&analysis.cycles, None)
}

pub async fn impact(
    root: PathBuf,
    ids: Vec<String>,
    breaking: bool,
    description: Option<String>,
) -> anyhow::Result<()> {
    let config = AnalysisConfig::load(&root)?;
    let analyzer = Analyzer::new(&config);

    let graph = match thicket_core::load_snapshot(&root)? {
        Some(graph) => {
            tracing::info!("Using cached snapshot");
            graph
        }
        None => {
            tracing::info!("No cached snapshot, analyzing first");
            let mut graph = build_graph(&root, &config).await?.graph;
            analyzer.analyze(&mut graph);
            thicket_core::save_snapshot(&graph, &root)?;
            graph
        }
    };

    let changed: Vec<NodeId> = ids
        .into_iter()
        .map(|id| NodeId::new(normalize_path(&id).unwrap_or(id)))
        .collect();
    let nature = if breaking {
        ChangeNature::Breaking
    } else {
        ChangeNature::Additive
    };
    let mut change = ChangeSet::new(changed).with_nature(nature);
    if let Some(description) = description {
        change = change.with_description(description);
    }

    let result = analyzer.impact(&graph, &change)?;
    write_json(&result, None)
}

pub fn clear(root: PathBuf) -> anyhow::Result<()> {
    tracing::info!("Clearing cache for: {}", root.display());

    thicket_core::clear_cache(&root)?;

    tracing::info!("Cache cleared");
    Ok(())
}

/// Scan the tree and build its graph. Ctrl-C cancels the scan.
async fn build_graph(root: &Path, config: &AnalysisConfig) -> anyhow::Result<BuildOutput> {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling scan");
            interrupt.cancel();
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(report_progress(rx));

    let scanner = Scanner::new(root, config.scan.clone()).with_progress(tx.clone());
    let files = scanner
        .discover()
        .with_context(|| format!("scanning {}", root.display()))?;
    let output = GraphBuilder::new()
        .with_progress(tx)
        .ingest(scanner.record_stream(files, &cancel), &cancel)
        .await?;

    drop(scanner);
    if let Err(err) = reporter.await {
        tracing::debug!("Progress reporter stopped: {}", err);
    }
    Ok(output)
}

async fn report_progress(mut rx: mpsc::UnboundedReceiver<ProgressEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::ScanStarted { total } => {
                tracing::info!("Scanning {} file(s)", total);
            }
            ProgressEvent::FileScanned { path, completed, total } => {
                tracing::debug!("[{}/{}] {}", completed, total, path);
            }
            ProgressEvent::RecordMerged { .. } => {}
            ProgressEvent::BuildFinished { nodes, edges, warnings } => {
                tracing::info!(
                    "Graph ready: {} nodes, {} edges, {} unresolved",
                    nodes,
                    edges,
                    warnings
                );
            }
        }
    }
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
