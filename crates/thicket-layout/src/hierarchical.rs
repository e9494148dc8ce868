//! Layered placement by dependency depth
//!
//! Nodes with no incoming edges are roots at level 0 and every other node
//! sits at its breadth-first distance from the nearest root. Nodes that no
//! root reaches (members of a cycle nothing enters) seed a new level-0 root
//! in insertion order.

use std::collections::{HashMap, VecDeque};

use thicket_core::{GraphModel, NodeId};

use crate::engine::{Canvas, Point};

pub fn layout(graph: &GraphModel, canvas: &Canvas) -> Vec<Point> {
    let levels = assign_levels(graph);
    let Some(&deepest) = levels.iter().max() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); deepest + 1];
    for (node, &level) in levels.iter().enumerate() {
        rows[level].push(node);
    }

    let row_gap = canvas.height() / (rows.len() + 1) as f64;
    let mut positions = vec![Point::default(); levels.len()];
    for (level, row) in rows.iter().enumerate() {
        let y = canvas.min_y + row_gap * (level + 1) as f64;
        let col_gap = canvas.width() / (row.len() + 1) as f64;
        for (slot, &node) in row.iter().enumerate() {
            positions[node] = Point::new(canvas.min_x + col_gap * (slot + 1) as f64, y);
        }
    }
    positions
}

/// Level of each node, in insertion order.
pub fn assign_levels(graph: &GraphModel) -> Vec<usize> {
    let ids: Vec<&NodeId> = graph.node_ids().collect();
    let index: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let children: Vec<Vec<usize>> = ids
        .iter()
        .map(|id| {
            graph
                .dependencies(id)
                .into_iter()
                .filter_map(|t| index.get(t).copied())
                .collect()
        })
        .collect();

    let mut levels: Vec<Option<usize>> = vec![None; ids.len()];
    let mut queue = VecDeque::new();

    for (i, id) in ids.iter().enumerate() {
        let has_incoming = graph.edges_to(id).iter().any(|e| !e.is_self_loop());
        if !has_incoming {
            levels[i] = Some(0);
            queue.push_back(i);
        }
    }
    spread(&children, &mut levels, &mut queue);

    for i in 0..ids.len() {
        if levels[i].is_none() {
            levels[i] = Some(0);
            queue.push_back(i);
            spread(&children, &mut levels, &mut queue);
        }
    }

    levels.into_iter().map(Option::unwrap_or_default).collect()
}

fn spread(children: &[Vec<usize>], levels: &mut [Option<usize>], queue: &mut VecDeque<usize>) {
    while let Some(node) = queue.pop_front() {
        let next = levels[node].unwrap_or_default() + 1;
        for &child in &children[node] {
            if levels[child].is_none() {
                levels[child] = Some(next);
                queue.push_back(child);
            }
        }
    }
}
