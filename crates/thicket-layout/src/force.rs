//! Force-directed placement
//!
//! Every pair of nodes repels with a force inversely proportional to their
//! distance; every edge pulls its endpoints together with a force
//! proportional to the squared distance over the ideal edge length. Each
//! step's displacement is capped by a temperature that cools linearly to
//! zero over the run. Initial positions come from a seeded RNG, so the same
//! seed and graph always give the same coordinates.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thicket_core::{GraphModel, NodeId};

use crate::engine::{Canvas, Point};

const MIN_DISTANCE: f64 = 0.01;

pub fn layout(graph: &GraphModel, canvas: &Canvas, iterations: usize, seed: u64) -> Vec<Point> {
    let n = graph.node_count();
    match n {
        0 => return Vec::new(),
        1 => return vec![canvas.center()],
        _ => {}
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions: Vec<Point> = (0..n)
        .map(|_| {
            Point::new(
                rng.gen_range(canvas.min_x..=canvas.max_x),
                rng.gen_range(canvas.min_y..=canvas.max_y),
            )
        })
        .collect();

    let index: HashMap<&NodeId, usize> = graph.node_ids().enumerate().map(|(i, id)| (id, i)).collect();
    let springs: Vec<(usize, usize)> = graph
        .edges()
        .filter(|e| !e.is_self_loop())
        .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
        .collect();

    let area = (canvas.width() * canvas.height()).max(1.0);
    let k = (area / n as f64).sqrt();
    let initial_temperature = canvas.width().max(canvas.height()) / 10.0;

    for step in 0..iterations {
        let temperature = initial_temperature * (1.0 - step as f64 / iterations as f64);
        let mut displacement = vec![Point::default(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy, dist) = separation(positions[i], positions[j], i, j);
                let force = k * k / dist;
                let (fx, fy) = (dx / dist * force, dy / dist * force);
                displacement[i].x += fx;
                displacement[i].y += fy;
                displacement[j].x -= fx;
                displacement[j].y -= fy;
            }
        }

        for &(s, t) in &springs {
            let (dx, dy, dist) = separation(positions[s], positions[t], s, t);
            let force = dist * dist / k;
            let (fx, fy) = (dx / dist * force, dy / dist * force);
            displacement[s].x -= fx;
            displacement[s].y -= fy;
            displacement[t].x += fx;
            displacement[t].y += fy;
        }

        for (position, d) in positions.iter_mut().zip(&displacement) {
            let length = (d.x * d.x + d.y * d.y).sqrt();
            if length > 0.0 {
                let capped = length.min(temperature);
                let moved = Point::new(
                    position.x + d.x / length * capped,
                    position.y + d.y / length * capped,
                );
                *position = canvas.clamp(moved);
            }
        }
    }

    positions
}

/// Vector from `b` to `a` and its length, never zero. Coincident points are
/// pushed apart along an index-dependent direction.
fn separation(a: Point, b: Point, i: usize, j: usize) -> (f64, f64, f64) {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    let dist = (dx * dx + dy * dy).sqrt();
    if dist >= MIN_DISTANCE {
        return (dx, dy, dist);
    }
    let angle = (i * 31 + j * 17) as f64;
    (
        angle.cos() * MIN_DISTANCE,
        angle.sin() * MIN_DISTANCE,
        MIN_DISTANCE,
    )
}
