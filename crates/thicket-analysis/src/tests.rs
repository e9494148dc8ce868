//! Unit tests for thicket-analysis module

use crate::*;
use thicket_core::test_utils::{add_edges, file_node, graph_from_edges, graph_with_nodes};
use thicket_core::{
    AnalysisConfig, ArtifactStats, CycleConfig, Edge, EdgeKind, GraphModel, Health, Importance,
    NodeId,
};

fn ids(values: &[&str]) -> Vec<NodeId> {
    values.iter().map(|v| NodeId::from(*v)).collect()
}

// ---- cycles ----

#[test]
fn test_no_edges_no_cycles() {
    let mut graph = graph_with_nodes(&["a", "b", "c"]);
    let cycles = CycleDetector::default().detect(&mut graph);

    assert!(cycles.is_empty());
    assert_eq!(graph.edges().filter(|e| e.is_circular).count(), 0);
    assert_eq!(graph.metadata().total_cycles, 0);
    assert_eq!(graph.metadata().max_cycle_length, 0);
}

#[test]
fn test_acyclic_graph_has_no_cycles() {
    let mut graph = graph_from_edges(&[("a", "b"), ("b", "c"), ("a", "c")]);
    assert!(CycleDetector::default().detect(&mut graph).is_empty());
    assert!(graph.edges().all(|e| !e.is_circular));
}

#[test]
fn test_triangle_cycle() {
    let mut graph = graph_from_edges(&[("a", "b"), ("b", "c"), ("c", "a")]);
    let cycles = CycleDetector::default().detect(&mut graph);

    assert_eq!(cycles.len(), 1);
    let cycle = &cycles[0];
    assert_eq!(cycle.nodes, ids(&["a", "b", "c"]));
    assert_eq!(cycle.length, 3);
    assert_eq!(cycle.severity, Severity::Medium);
    assert_eq!(cycle.resolution.strategy, ResolutionStrategy::Restructure);
    assert_eq!(cycle.impact, 3);
    assert!(graph.edges().all(|e| e.is_circular));
    insta::assert_snapshot!(cycle.to_string(), @"a -> b -> c -> a");

    assert_eq!(graph.metadata().total_cycles, 1);
    assert_eq!(graph.metadata().max_cycle_length, 3);
    assert_eq!(graph.metadata().average_cycle_length, 3.0);
}

#[test]
fn test_direct_cycle_is_high() {
    let mut graph = graph_from_edges(&[("a", "b"), ("b", "a")]);
    let cycles = CycleDetector::default().detect(&mut graph);

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].severity, Severity::High);
    assert_eq!(
        cycles[0].resolution.strategy,
        ResolutionStrategy::ExtractInterface
    );
}

#[test]
fn test_self_loop_is_one_node_cycle() {
    let mut graph = graph_from_edges(&[("a", "a"), ("a", "b")]);
    let cycles = CycleDetector::default().detect(&mut graph);

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].nodes, ids(&["a"]));
    assert_eq!(cycles[0].severity, Severity::High);
    insta::assert_snapshot!(cycles[0].to_string(), @"a -> a");

    let circular: Vec<_> = graph.edges().filter(|e| e.is_circular).collect();
    assert_eq!(circular.len(), 1);
    assert!(circular[0].is_self_loop());
}

#[test]
fn test_detection_is_deterministic() {
    let mut graph = graph_from_edges(&[
        ("a", "b"),
        ("b", "a"),
        ("b", "c"),
        ("c", "d"),
        ("d", "b"),
        ("e", "e"),
    ]);
    let detector = CycleDetector::default();
    let first = detector.detect(&mut graph);
    let second = detector.detect(&mut graph);

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_cycle_reported_once_from_any_entry() {
    // Both x and y lead into the same cycle
    let mut graph = graph_from_edges(&[("x", "a"), ("y", "b"), ("a", "b"), ("b", "a")]);
    let cycles = CycleDetector::default().detect(&mut graph);

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].nodes, ids(&["a", "b"]));
    // x and y depend on members
    assert_eq!(cycles[0].impact, 4);
    let circular = graph.edges().filter(|e| e.is_circular).count();
    assert_eq!(circular, 2);
}

#[test]
fn test_parallel_edges_all_flagged() {
    let mut graph = graph_from_edges(&[("a", "b"), ("b", "a")]);
    graph
        .add_edge(Edge::new("a", "b", EdgeKind::Dependency))
        .unwrap();

    let cycles = CycleDetector::default().detect(&mut graph);
    assert_eq!(cycles.len(), 1);
    assert!(graph.edges().all(|e| e.is_circular));
}

#[test]
fn test_long_cycle_is_critical() {
    let mut graph = graph_from_edges(&[
        ("a", "b"),
        ("b", "c"),
        ("c", "d"),
        ("d", "e"),
        ("e", "f"),
        ("f", "a"),
    ]);
    let cycles = CycleDetector::default().detect(&mut graph);
    assert_eq!(cycles[0].length, 6);
    assert_eq!(cycles[0].severity, Severity::Critical);

    let mut graph = graph_from_edges(&[("a", "b"), ("b", "c"), ("c", "a")]);
    let strict = CycleDetector::new(&CycleConfig { critical_length: 2 });
    assert_eq!(strict.detect(&mut graph)[0].severity, Severity::Critical);
}

#[test]
fn test_optional_cycle_is_low() {
    let mut graph = GraphModel::new();
    for id in ["a.test.ts", "b.test.ts"] {
        graph
            .add_node(file_node(id).with_importance(Importance::Optional))
            .unwrap();
    }
    add_edges(&mut graph, &[("a.test.ts", "b.test.ts"), ("b.test.ts", "a.test.ts")]);

    let cycles = CycleDetector::default().detect(&mut graph);
    assert_eq!(cycles[0].severity, Severity::Low);
}

#[test]
fn test_cross_category_cycle_suggests_facade() {
    let mut graph = GraphModel::new();
    graph.add_node(file_node("a").with_category("ui")).unwrap();
    graph.add_node(file_node("b").with_category("core")).unwrap();
    graph.add_node(file_node("c").with_category("ui")).unwrap();
    add_edges(&mut graph, &[("a", "b"), ("b", "c"), ("c", "a")]);

    let cycles = CycleDetector::default().detect(&mut graph);
    assert_eq!(cycles[0].categories, vec!["core", "ui"]);
    assert_eq!(cycles[0].resolution.strategy, ResolutionStrategy::Facade);
    assert_eq!(
        cycles[0].resolution.summary,
        ResolutionStrategy::Facade.summary()
    );
}

#[test]
fn test_cycle_metadata_averages() {
    let mut graph = graph_from_edges(&[
        ("a", "b"),
        ("b", "a"),
        ("c", "d"),
        ("d", "e"),
        ("e", "c"),
    ]);
    let cycles = CycleDetector::default().detect(&mut graph);

    assert_eq!(cycles.len(), 2);
    assert_eq!(graph.metadata().total_cycles, 2);
    assert_eq!(graph.metadata().max_cycle_length, 3);
    assert_eq!(graph.metadata().average_cycle_length, 2.5);
}

#[test]
fn test_find_cycles_is_pure() {
    let graph = graph_from_edges(&[("a", "b"), ("b", "a")]);
    assert_eq!(find_cycles(&graph), vec![ids(&["a", "b"])]);
    assert!(graph.edges().all(|e| !e.is_circular));
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let names: Vec<String> = (0..20_000).map(|i| format!("n{i}")).collect();
    let mut pairs: Vec<(&str, &str)> = names
        .windows(2)
        .map(|w| (w[0].as_str(), w[1].as_str()))
        .collect();
    pairs.push((names[names.len() - 1].as_str(), names[0].as_str()));
    let mut graph = graph_from_edges(&pairs);

    let cycles = CycleDetector::default().detect(&mut graph);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].length, 20_000);
}

// ---- impact ----

fn chain() -> GraphModel {
    // b depends on a, c on b, d on c
    graph_from_edges(&[("b", "a"), ("c", "b"), ("d", "c")])
}

#[test]
fn test_impact_follows_dependents() {
    let graph = chain();
    let result = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(["a"]))
        .unwrap();

    assert_eq!(result.sources, ids(&["a"]));
    let affected: Vec<_> = result.affected.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(affected, vec!["b", "c", "d"]);
    assert!(!result.is_affected(&NodeId::from("a")));

    let b = result.level_of(&NodeId::from("b")).unwrap();
    let d = result.level_of(&NodeId::from("d")).unwrap();
    assert_eq!(b, ImpactLevel::Critical);
    assert_eq!(d, ImpactLevel::High);
    assert!(b > d);

    let d = result.get(&NodeId::from("d")).unwrap();
    assert_eq!(d.depth, 3);
    assert_eq!(d.propagation_path, ids(&["a", "b", "c", "d"]));
    assert_eq!(d.source, NodeId::from("a"));
    assert_eq!(result.max_depth, 3);
}

#[test]
fn test_impact_of_leaf_dependent_is_empty() {
    let graph = chain();
    let result = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(["d"]))
        .unwrap();
    assert!(result.affected.is_empty());
    assert_eq!(result.total_effort_hours, 0.0);
    assert_eq!(result.max_depth, 0);
}

#[test]
fn test_impact_unknown_node() {
    let graph = chain();
    let err = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(["a", "zzz", "yyy"]))
        .unwrap_err();

    assert_eq!(
        err,
        ImpactError::UnknownNode {
            missing: ids(&["zzz", "yyy"])
        }
    );
    insta::assert_snapshot!(err.to_string(), @"unknown node(s) in change set: zzz, yyy");
}

#[test]
fn test_impact_empty_change_set() {
    let graph = chain();
    let err = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(Vec::<NodeId>::new()))
        .unwrap_err();
    assert_eq!(err, ImpactError::EmptyChangeSet);
}

#[test]
fn test_impact_terminates_on_cycles() {
    let graph = graph_from_edges(&[("a", "b"), ("b", "a"), ("c", "a")]);
    let result = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(["a"]))
        .unwrap();

    let affected: Vec<_> = result.affected.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(affected, vec!["b", "c"]);
    assert!(result.affected.iter().all(|a| a.depth == 1));
}

#[test]
fn test_impact_multiple_sources() {
    let graph = chain();
    let result = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(["a", "c", "a"]))
        .unwrap();

    assert_eq!(result.sources, ids(&["a", "c"]));
    let affected: Vec<_> = result
        .affected
        .iter()
        .map(|a| (a.id.as_str(), a.depth, a.source.as_str()))
        .collect();
    assert_eq!(affected, vec![("b", 1, "a"), ("d", 1, "c")]);
}

#[test]
fn test_breaking_over_strong_edges() {
    let graph = chain();
    let result = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(["a"]))
        .unwrap();

    // Import edges default to strength 0.8
    assert_eq!(result.breaking_changes.len(), 3);
    assert!(result
        .breaking_changes
        .iter()
        .all(|b| b.reason == BreakingReason::StrongEdge));

    let order: Vec<_> = result
        .migration_paths
        .iter()
        .map(|m| (m.node.as_str(), m.depth))
        .collect();
    assert_eq!(order, vec![("b", 1), ("c", 2), ("d", 3)]);
    assert_eq!(result.migration_paths[1].steps, ids(&["a", "b", "c"]));
}

#[test]
fn test_weak_edges_break_only_when_declared() {
    let mut graph = graph_with_nodes(&["a", "b", "c"]);
    graph
        .add_edge(Edge::new("b", "a", EdgeKind::Import).with_strength(0.5))
        .unwrap();
    graph
        .add_edge(Edge::new("c", "a", EdgeKind::Composition))
        .unwrap();

    let propagator = ImpactPropagator::default();
    let additive = propagator
        .propagate(&graph, &ChangeSet::new(["a"]))
        .unwrap();
    assert_eq!(additive.affected.len(), 2);
    assert!(additive.breaking_changes.is_empty());
    assert!(additive.migration_paths.is_empty());

    let breaking = propagator
        .propagate(
            &graph,
            &ChangeSet::new(["a"]).with_nature(ChangeNature::Breaking),
        )
        .unwrap();
    assert_eq!(breaking.breaking_changes.len(), 2);
    assert!(breaking
        .breaking_changes
        .iter()
        .all(|b| b.reason == BreakingReason::ChangeNature));
}

#[test]
fn test_effort_uses_node_complexity() {
    let mut graph = GraphModel::new();
    graph.add_node(file_node("a")).unwrap();
    graph
        .add_node(file_node("b").with_stats(ArtifactStats {
            size: 0,
            lines: 0,
            complexity: 3.0,
        }))
        .unwrap();
    add_edges(&mut graph, &[("b", "a")]);

    let result = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(["a"]))
        .unwrap();
    // 1h x (1 + 3) x (1 + 1/1)
    assert_eq!(result.affected[0].effort_hours, 8.0);
    assert_eq!(result.total_effort_hours, 8.0);
}

#[test]
fn test_impact_result_serializes_camel_case() {
    let graph = chain();
    let result = ImpactPropagator::default()
        .propagate(&graph, &ChangeSet::new(["a"]))
        .unwrap();
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["affected"][0]["level"], serde_json::json!("critical"));
    assert_eq!(
        value["affected"][0]["propagationPath"],
        serde_json::json!(["a", "b"])
    );
    assert_eq!(value["nature"], serde_json::json!("additive"));
    assert!(value["totalEffortHours"].is_number());
    assert!(value.get("description").is_none());
}

#[test]
fn test_impact_carries_change_description() {
    let graph = chain();
    let change = ChangeSet::new(["a"])
        .with_nature(ChangeNature::Internal)
        .with_description("drop legacy export");
    let result = ImpactPropagator::default().propagate(&graph, &change).unwrap();

    assert_eq!(result.description.as_deref(), Some("drop legacy export"));
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["description"], serde_json::json!("drop legacy export"));
    assert_eq!(value["nature"], serde_json::json!("internal"));
}

// ---- metrics ----

#[test]
fn test_single_isolated_node() {
    let graph = graph_with_nodes(&["solo"]);
    let metrics = MetricsCalculator::default().compute(&graph);

    assert_eq!(metrics.connected_components, 1);
    assert_eq!(metrics.average_degree, 0.0);
    assert_eq!(metrics.undirected_average_degree, 0.0);
    assert_eq!(metrics.density, 0.0);
    assert_eq!(metrics.health, Health::Excellent);
}

#[test]
fn test_empty_graph_is_excellent() {
    let graph = GraphModel::new();
    let metrics = MetricsCalculator::default().compute(&graph);

    assert_eq!(metrics.total_nodes, 0);
    assert_eq!(metrics.connected_components, 0);
    assert_eq!(metrics.complexity, 0.0);
    assert_eq!(metrics.health, Health::Excellent);
}

#[test]
fn test_triangle_metrics() {
    let mut graph = graph_from_edges(&[("a", "b"), ("b", "c"), ("c", "a")]);
    CycleDetector::default().detect(&mut graph);
    let metrics = MetricsCalculator::default().compute(&graph);

    assert_eq!(metrics.average_degree, 1.0);
    assert_eq!(metrics.undirected_average_degree, 2.0);
    assert_eq!(metrics.density, 0.5);
    assert_eq!(metrics.clustering_coefficient, 1.0);
    assert_eq!(metrics.connected_components, 1);
    assert_eq!(metrics.strongly_connected_components, 1);
    assert_eq!(metrics.cycle_count, 1);
    assert_eq!(metrics.circular_edges, 3);
    assert!((metrics.complexity - 12f64.ln()).abs() < 1e-9);
    assert_eq!(metrics.health, Health::Good);
}

#[test]
fn test_components_counted() {
    let mut graph = graph_from_edges(&[("a", "b"), ("c", "d")]);
    graph.add_node(file_node("e")).unwrap();
    let metrics = MetricsCalculator::default().compute(&graph);

    assert_eq!(metrics.connected_components, 3);
    assert_eq!(metrics.strongly_connected_components, 5);
    assert_eq!(metrics.clustering_coefficient, 0.0);
}

#[test]
fn test_health_ladder() {
    let calculator = MetricsCalculator::default();
    assert_eq!(calculator.health(11, 0.0), Health::Critical);
    assert_eq!(calculator.health(6, 0.0), Health::Poor);
    assert_eq!(calculator.health(0, 8.5), Health::Poor);
    assert_eq!(calculator.health(3, 0.0), Health::Fair);
    assert_eq!(calculator.health(0, 6.5), Health::Fair);
    assert_eq!(calculator.health(1, 0.0), Health::Good);
    assert_eq!(calculator.health(0, 4.5), Health::Good);
    assert_eq!(calculator.health(0, 1.0), Health::Excellent);
}

#[test]
fn test_configured_thresholds() {
    let mut config = AnalysisConfig::default();
    config.health.good_cycles = 3;
    config.complexity.cycle_weight = 0.0;
    let calculator = MetricsCalculator::new(&config);

    assert_eq!(calculator.health(2, 1.0), Health::Excellent);
    assert!((calculator.complexity(3, 0, 100) - 4f64.ln()).abs() < 1e-12);
}

#[test]
fn test_hubs() {
    let graph = graph_from_edges(&[("b", "a"), ("c", "a"), ("d", "a"), ("d", "b")]);
    let metrics = MetricsCalculator::default().compute(&graph);

    let depended: Vec<_> = metrics
        .most_depended_upon
        .iter()
        .map(|h| (h.id.as_str(), h.degree))
        .collect();
    assert_eq!(depended, vec![("a", 3), ("b", 1)]);

    let dependent: Vec<_> = metrics
        .most_dependent
        .iter()
        .map(|h| (h.id.as_str(), h.degree))
        .collect();
    assert_eq!(dependent, vec![("d", 2), ("b", 1), ("c", 1)]);

    let mut config = AnalysisConfig::default();
    config.metrics.hub_limit = 1;
    let limited = MetricsCalculator::new(&config).compute(&graph);
    assert_eq!(limited.most_dependent.len(), 1);
}

// ---- pipeline ----

#[test]
fn test_analyzer_writes_metadata() {
    let mut graph = graph_from_edges(&[("a", "b"), ("b", "a"), ("c", "a")]);
    let analysis = Analyzer::default().analyze(&mut graph);

    assert_eq!(analysis.cycles.len(), 1);
    let metadata = graph.metadata();
    assert_eq!(metadata.total_nodes, 3);
    assert_eq!(metadata.total_edges, 3);
    assert_eq!(metadata.total_cycles, 1);
    assert_eq!(metadata.complexity, analysis.metrics.complexity);
    assert_eq!(metadata.health, Health::Good);
}

#[test]
fn test_analyzer_on_empty_graph() {
    let mut graph = GraphModel::new();
    let analysis = Analyzer::default().analyze(&mut graph);

    assert!(analysis.cycles.is_empty());
    assert_eq!(graph.metadata().health, Health::Excellent);
    assert_eq!(graph.metadata().total_cycles, 0);
}

#[test]
fn test_report_serialization() {
    let mut graph = graph_from_edges(&[("a", "b"), ("b", "a")]);
    let analyzer = Analyzer::default();
    let analysis = analyzer.analyze(&mut graph);
    let report = AnalysisReport::new(&graph, analysis);

    let value = serde_json::to_value(&report).unwrap();
    assert!(value.get("impact").is_none());
    assert_eq!(value["graph"]["edges"][0]["isCircular"], serde_json::json!(true));
    assert_eq!(value["graph"]["metadata"]["totalCycles"], serde_json::json!(1));
    assert_eq!(
        value["cycles"][0]["resolution"]["strategy"],
        serde_json::json!("extract-interface")
    );
    assert_eq!(value["metrics"]["averageDegree"], serde_json::json!(1.0));

    let impact = analyzer
        .impact(&graph, &ChangeSet::new(["a"]))
        .unwrap();
    let report = report.with_impact(impact);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["impact"]["sources"], serde_json::json!(["a"]));

    let parsed: AnalysisReport = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, report);
}
