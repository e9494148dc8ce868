//! Integration tests for Thicket
//!
//! These tests drive a real directory tree through scanning, graph building,
//! analysis, layout and the snapshot cache.

use thicket_analysis::{AnalysisReport, Analyzer, ChangeSet, ImpactLevel, Severity};
use thicket_builder::{BuildOutput, GraphBuilder};
use thicket_core::test_utils::create_repo_with_structure;
use thicket_core::{
    AnalysisConfig, Edge, GraphModel, Health, LayoutAlgorithm, NodeId, ScanSettings,
};
use thicket_layout::{LayoutEngine, style_nodes};
use thicket_scanner::Scanner;
use tokio_util::sync::CancellationToken;

fn fixture() -> tempfile::TempDir {
    create_repo_with_structure(&[
        ("package.json", r#"{"name": "shop", "dependencies": {"lodash": "4"}}"#),
        (
            "src/index.ts",
            "import { cart } from './cart';\nimport { api } from './api/client';\n",
        ),
        ("src/cart.ts", "import { price } from './pricing';\nexport const cart = 1;\n"),
        ("src/pricing.ts", "import { cart } from './cart';\nexport const price = 2;\n"),
        ("src/api/client.ts", "import _ from 'lodash';\nexport const api = {};\n"),
        ("node_modules/lodash/index.js", "module.exports = {};\n"),
    ])
}

async fn build(root: &std::path::Path, settings: ScanSettings) -> BuildOutput {
    let cancel = CancellationToken::new();
    let scanner = Scanner::new(root, settings);
    let files = scanner.discover().unwrap();
    GraphBuilder::new()
        .ingest(scanner.record_stream(files, &cancel), &cancel)
        .await
        .unwrap()
}

fn circular_edges(graph: &GraphModel) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = graph
        .edges()
        .filter(|e| e.is_circular)
        .map(|e: &Edge| (e.source.to_string(), e.target.to_string()))
        .collect();
    pairs.sort();
    pairs
}

#[tokio::test]
async fn test_scan_build_analyze() {
    let repo = fixture();
    let output = build(repo.path(), ScanSettings::default()).await;
    let mut graph = output.graph;

    // package root plus four sources; node_modules is never read
    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.edge_count(), 4);

    let analysis = Analyzer::default().analyze(&mut graph);
    assert_eq!(analysis.cycles.len(), 1);
    let cycle = &analysis.cycles[0];
    assert_eq!(cycle.length, 2);
    assert_eq!(cycle.severity, Severity::High);
    assert!(cycle.contains(&NodeId::from("src/cart.ts")));
    assert!(cycle.contains(&NodeId::from("src/pricing.ts")));

    assert_eq!(
        circular_edges(&graph),
        vec![
            ("src/cart.ts".to_string(), "src/pricing.ts".to_string()),
            ("src/pricing.ts".to_string(), "src/cart.ts".to_string()),
        ]
    );
    assert_eq!(graph.metadata().total_cycles, 1);
    assert_ne!(graph.metadata().health, Health::Excellent);
}

#[tokio::test]
async fn test_impact_reaches_dependents() {
    let repo = fixture();
    let graph = build(repo.path(), ScanSettings::default()).await.graph;

    let result = Analyzer::default()
        .impact(&graph, &ChangeSet::new([NodeId::from("src/api/client.ts")]))
        .unwrap();

    assert!(result.is_affected(&NodeId::from("src/index.ts")));
    assert_eq!(
        result.level_of(&NodeId::from("src/index.ts")),
        Some(ImpactLevel::Critical)
    );
    assert!(!result.is_affected(&NodeId::from("src/cart.ts")));
}

#[tokio::test]
async fn test_layout_and_snapshot_round_trip() {
    let repo = fixture();
    let config = AnalysisConfig::default();
    let mut graph = build(repo.path(), config.scan.clone()).await.graph;
    let analysis = Analyzer::new(&config).analyze(&mut graph);

    style_nodes(&mut graph);
    let placed = LayoutEngine::default()
        .with_algorithm(LayoutAlgorithm::Hierarchical)
        .apply(&mut graph);
    assert_eq!(placed, graph.node_count());

    thicket_core::save_snapshot(&graph, repo.path()).unwrap();
    let restored = thicket_core::load_snapshot(repo.path()).unwrap().unwrap();

    assert_eq!(restored.node_count(), graph.node_count());
    assert_eq!(restored.edge_count(), graph.edge_count());
    assert_eq!(circular_edges(&restored), circular_edges(&graph));
    assert_eq!(restored.layout().algorithm, LayoutAlgorithm::Hierarchical);
    assert_eq!(
        restored.node_ids().collect::<Vec<_>>(),
        graph.node_ids().collect::<Vec<_>>()
    );

    let report = AnalysisReport::new(&restored, analysis);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["cycles"].as_array().map(Vec::len), Some(1));
    assert!(json.get("impact").is_none());
}

#[tokio::test]
async fn test_cancelled_ingest_fails() {
    let repo = fixture();
    let scanner = Scanner::new(repo.path(), ScanSettings::default());
    let files = scanner.discover().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = GraphBuilder::new()
        .ingest(scanner.record_stream(files, &cancel), &cancel)
        .await;
    assert!(result.is_err());
}
