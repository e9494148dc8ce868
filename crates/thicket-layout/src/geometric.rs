//! Circular and grid placement. Both depend only on node order.

use std::f64::consts::PI;

use crate::engine::{Canvas, Point};

/// Share of the half-extent used as the circle radius.
const RADIUS_FILL: f64 = 0.8;

/// Evenly spaced around a circle, starting at the top and going clockwise.
pub fn circular(n: usize, canvas: &Canvas) -> Vec<Point> {
    let center = canvas.center();
    if n == 1 {
        return vec![center];
    }
    let radius = canvas.width().min(canvas.height()) / 2.0 * RADIUS_FILL;
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64 - PI / 2.0;
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Row-major near-square grid, each node centered in its cell.
pub fn grid(n: usize, canvas: &Canvas) -> Vec<Point> {
    if n == 0 {
        return Vec::new();
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    let cell_w = canvas.width() / cols as f64;
    let cell_h = canvas.height() / rows as f64;
    (0..n)
        .map(|i| {
            let (row, col) = (i / cols, i % cols);
            Point::new(
                canvas.min_x + cell_w * (col as f64 + 0.5),
                canvas.min_y + cell_h * (row as f64 + 0.5),
            )
        })
        .collect()
}
