//! Layout dispatch and canvas geometry

use serde::{Deserialize, Serialize};
use thicket_core::{GraphModel, LayoutAlgorithm, LayoutParams, NodeId};
use tracing::{debug, info};

use crate::{force, geometric, hierarchical};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Drawable area, centered on the configured center and sized by width, height and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Canvas {
    pub fn from_params(params: &LayoutParams) -> Self {
        let scale = params.scale.abs();
        let half_w = (params.width * scale).max(0.0) / 2.0;
        let half_h = (params.height * scale).max(0.0) / 2.0;
        Canvas {
            min_x: params.center_x - half_w,
            min_y: params.center_y - half_h,
            max_x: params.center_x + half_w,
            max_y: params.center_y + half_h,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
        )
    }
}

/// Positions nodes with one of the layout modes.
pub struct LayoutEngine {
    params: LayoutParams,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        LayoutEngine { params }
    }

    pub fn with_algorithm(mut self, algorithm: LayoutAlgorithm) -> Self {
        self.params.algorithm = algorithm;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params.seed = seed;
        self
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Positions for every node, in insertion order. Does not touch the graph.
    pub fn compute(&self, graph: &GraphModel) -> Vec<(NodeId, Point)> {
        let canvas = Canvas::from_params(&self.params);
        let points = match self.params.algorithm {
            LayoutAlgorithm::ForceDirected => {
                force::layout(graph, &canvas, self.params.iterations, self.params.seed)
            }
            LayoutAlgorithm::Hierarchical => hierarchical::layout(graph, &canvas),
            LayoutAlgorithm::Circular => geometric::circular(graph.node_count(), &canvas),
            LayoutAlgorithm::Grid => geometric::grid(graph.node_count(), &canvas),
        };
        graph.node_ids().cloned().zip(points).collect()
    }

    /// Recompute every node position and record the parameters on the graph.
    ///
    /// Only `x` and `y` are written; styling is left alone.
    pub fn apply(&self, graph: &mut GraphModel) -> usize {
        let positions = self.compute(graph);
        let mut placed = 0;
        for (id, point) in &positions {
            if let Some(visual) = graph.visual_mut(id) {
                visual.x = point.x;
                visual.y = point.y;
                placed += 1;
            } else {
                debug!("Node {} vanished before layout", id);
            }
        }
        graph.set_layout(self.params.clone());
        info!(
            "Laid out {} node(s) with {} layout",
            placed, self.params.algorithm
        );
        placed
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutParams::default())
    }
}
