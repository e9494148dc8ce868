//! Node and edge styling for renderers

use serde::{Deserialize, Serialize};
use thicket_core::{ArtifactKind, EdgeId, EdgeKind, GraphModel, Shape};

const PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2b", "#59a14f", "#76b7b2", "#edc948", "#b07aa1", "#ff9da7", "#9c755f",
    "#bab0ac", "#86bcb6",
];

const CIRCULAR_COLOR: &str = "#e15759";
const DEFAULT_EDGE_COLOR: &str = "#8c8c8c";

/// Stable palette color for a category tag.
pub fn category_color(category: &str) -> &'static str {
    // FNV-1a; must not change between releases
    let hash = category
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    PALETTE[(hash % PALETTE.len() as u64) as usize]
}

pub fn shape_for(kind: ArtifactKind) -> Shape {
    match kind {
        ArtifactKind::File => Shape::Circle,
        ArtifactKind::Package => Shape::Square,
        ArtifactKind::Module => Shape::Hexagon,
        ArtifactKind::Directory => Shape::Triangle,
        ArtifactKind::Service => Shape::Diamond,
    }
}

/// Write color and shape into each node's visual payload. Positions are kept.
pub fn style_nodes(graph: &mut GraphModel) {
    let styles: Vec<_> = graph
        .nodes()
        .map(|n| (n.id.clone(), category_color(&n.category), shape_for(n.kind)))
        .collect();
    for (id, color, shape) in styles {
        if let Some(visual) = graph.visual_mut(&id) {
            visual.color = Some(color.to_string());
            visual.shape = Some(shape);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub edge: EdgeId,
    pub color: String,
    pub dashed: bool,
    pub width: f64,
    pub highlighted: bool,
}

/// Styles for every edge, in insertion order. Circular edges are highlighted.
pub fn edge_styles(graph: &GraphModel) -> Vec<EdgeStyle> {
    graph
        .edges()
        .map(|e| {
            let color = if e.is_circular {
                CIRCULAR_COLOR
            } else {
                DEFAULT_EDGE_COLOR
            };
            let emphasis = if e.is_circular { 1.0 } else { 0.0 };
            EdgeStyle {
                edge: e.id.clone(),
                color: color.to_string(),
                dashed: matches!(e.kind, EdgeKind::Export | EdgeKind::ServiceCall),
                width: 1.0 + 2.0 * e.strength + emphasis,
                highlighted: e.is_circular,
            }
        })
        .collect()
}
