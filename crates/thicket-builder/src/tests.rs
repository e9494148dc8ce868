//! Unit tests for thicket-builder module

use crate::*;
use thicket_core::{
    ArtifactKind, ArtifactStats, DiscoveryRecord, EdgeKind, ImportKind, Importance, NodeId,
};

fn no_deps(path: &str) -> DiscoveryRecord {
    DiscoveryRecord::new(path, Vec::<String>::new())
}

#[test]
fn test_build_relative_imports() {
    let output = GraphBuilder::build(vec![
        DiscoveryRecord::new("src/app.ts", ["./ui/button", "./utils"]),
        no_deps("src/ui/button.tsx"),
        no_deps("src/utils/index.ts"),
    ]);

    let graph = &output.graph;
    assert!(output.warnings.is_empty());
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);

    let app = NodeId::from("src/app.ts");
    let targets: Vec<_> = graph.dependencies(&app).into_iter().map(NodeId::as_str).collect();
    assert_eq!(targets, vec!["src/ui/button.tsx", "src/utils/index.ts"]);

    let edge = graph.edges_from(&app)[0];
    assert_eq!(edge.kind, EdgeKind::Import);
    assert_eq!(edge.metadata.import_kind, Some(ImportKind::Relative));
    assert_eq!(edge.metadata.specifier.as_deref(), Some("./ui/button"));
}

#[test]
fn test_forward_references_resolve() {
    // The importer arrives before the file it imports
    let output = GraphBuilder::build(vec![
        DiscoveryRecord::new("a.ts", ["./b"]),
        DiscoveryRecord::new("b.ts", ["./a"]),
    ]);
    assert_eq!(output.graph.edge_count(), 2);
}

#[test]
fn test_bare_specifier_resolves_to_package() {
    let output = GraphBuilder::build(vec![
        DiscoveryRecord::new("packages/ui/package.json", ["@acme/core"]).with_name("@acme/ui"),
        no_deps("packages/core/package.json").with_name("@acme/core"),
        DiscoveryRecord::new("apps/web/main.ts", ["@acme/ui/button", "react"]),
    ]);

    let graph = &output.graph;
    let ui = graph.node(&NodeId::from("packages/ui")).unwrap();
    assert_eq!(ui.kind, ArtifactKind::Package);
    assert_eq!(ui.label, "@acme/ui");
    assert_eq!(ui.importance, Importance::Critical);

    assert!(graph.has_edge_between(
        &NodeId::from("packages/ui"),
        &NodeId::from("packages/core"),
        EdgeKind::Dependency
    ));
    assert!(graph.has_edge_between(
        &NodeId::from("apps/web/main.ts"),
        &NodeId::from("packages/ui"),
        EdgeKind::Dependency
    ));

    // react is not part of the tree
    assert_eq!(output.warnings.len(), 1);
    assert_eq!(output.warnings[0].specifier, "react");
    assert_eq!(output.warnings[0].reason, UnresolvedReason::UnknownPackage);
}

#[test]
fn test_root_manifest_becomes_root_package() {
    let output = GraphBuilder::build(vec![no_deps("package.json").with_name("app")]);
    let node = output.graph.node(&NodeId::from(".")).unwrap();
    assert_eq!(node.kind, ArtifactKind::Package);
    assert_eq!(node.label, "app");
}

#[test]
fn test_unresolved_specifier_never_dangles() {
    let output = GraphBuilder::build(vec![
        DiscoveryRecord::new("src/a.ts", ["./missing", "./b", "../../../outside", "lodash"]),
        no_deps("src/b.ts"),
    ]);

    assert_eq!(output.graph.edge_count(), 1);
    assert_eq!(output.warnings.len(), 3);
    for edge in output.graph.edges() {
        assert!(output.graph.contains_node(&edge.source));
        assert!(output.graph.contains_node(&edge.target));
    }

    let reasons: Vec<_> = output.warnings.iter().map(|w| w.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![
            UnresolvedReason::NoMatchingFile,
            UnresolvedReason::EscapesRoot,
            UnresolvedReason::UnknownPackage,
        ]
    );
    insta::assert_snapshot!(
        output.warnings[0].to_string(),
        @"src/a.ts: cannot resolve './missing' (no matching file)"
    );
}

#[test]
fn test_one_warning_per_unresolved_specifier() {
    let output = GraphBuilder::build(vec![DiscoveryRecord::new("a.ts", ["./x", "./x"])]);
    assert_eq!(output.warnings.len(), 2);
    assert_eq!(output.graph.edge_count(), 0);
}

#[test]
fn test_repeated_imports_raise_usage_and_strength() {
    let output = GraphBuilder::build(vec![
        DiscoveryRecord::new("a.ts", ["./b", "./b.ts", "./b"]),
        no_deps("b.ts"),
    ]);

    assert_eq!(output.graph.edge_count(), 1);
    let edge = output.graph.edges().next().unwrap();
    assert_eq!(edge.metadata.usage_count, 3);
    assert!((edge.strength - 0.9).abs() < 1e-9);
}

#[test]
fn test_self_import_skipped_without_warning() {
    let output = GraphBuilder::build(vec![DiscoveryRecord::new("src/a.ts", ["./a"])]);
    assert_eq!(output.graph.edge_count(), 0);
    assert!(output.warnings.is_empty());
}

#[test]
fn test_repeated_record_reuses_node() {
    let output = GraphBuilder::build(vec![
        DiscoveryRecord::new("./src/a.ts", ["./b"]),
        DiscoveryRecord::new("src/a.ts", ["./c"]).with_stats(ArtifactStats {
            size: 120,
            lines: 10,
            complexity: 3.0,
        }),
        no_deps("src/b.ts"),
        no_deps("src/c.ts"),
    ]);

    assert_eq!(output.graph.node_count(), 3);
    assert_eq!(output.graph.edge_count(), 2);
    let a = output.graph.node(&NodeId::from("src/a.ts")).unwrap();
    assert_eq!(a.stats.lines, 10);
}

#[test]
fn test_record_overrides() {
    let mut record = no_deps("services/billing");
    record.kind = Some(ArtifactKind::Service);
    record.category = Some("payments".to_string());
    record.importance = Some(Importance::Critical);

    let output = GraphBuilder::build(vec![record]);
    let node = output.graph.node(&NodeId::from("services/billing")).unwrap();
    assert_eq!(node.kind, ArtifactKind::Service);
    assert_eq!(node.category, "payments");
    assert_eq!(node.importance, Importance::Critical);
}

#[test]
fn test_inferred_metadata() {
    let output = GraphBuilder::build(vec![
        no_deps("src/ui/button.test.tsx"),
        no_deps("src/core/index.ts"),
    ]);
    let test_file = output.graph.node(&NodeId::from("src/ui/button.test.tsx")).unwrap();
    assert_eq!(test_file.category, "ui");
    assert_eq!(test_file.importance, Importance::Optional);

    let module = output.graph.node(&NodeId::from("src/core/index.ts")).unwrap();
    assert_eq!(module.kind, ArtifactKind::Module);
    assert_eq!(module.category, "core");
}

#[test]
fn test_empty_build_is_valid() {
    let output = GraphBuilder::build(Vec::new());
    assert!(output.graph.is_empty());
    assert!(output.warnings.is_empty());
    assert_eq!(output.graph.metadata().total_cycles, 0);
}

#[test]
fn test_warnings_serialize() {
    let output = GraphBuilder::build(vec![DiscoveryRecord::new("a.ts", ["left-pad"])]);
    let value = serde_json::to_value(&output.warnings).unwrap();
    assert_eq!(value[0]["artifact"], serde_json::json!("a.ts"));
    assert_eq!(value[0]["reason"], serde_json::json!("unknown-package"));
}
