//! Flat layered pipeline for one nesting level.

use crate::layer::{LayerGraph, LayerNode};
use crate::{EdgeLabel, GraphLabel, acyclic, coordinate_system, order, position, rank};

#[derive(Debug, Clone, PartialEq)]
pub struct FlatLayout {
    /// Node centers, relative to the level's top-left corner.
    pub centers: Vec<(f64, f64)>,
    pub ranks: Vec<i32>,
    pub orders: Vec<usize>,
    pub width: f64,
    pub height: f64,
}

/// Lays out `sizes.len()` nodes connected by `edges` (indices into `sizes`).
pub fn layout_flat(
    sizes: &[(f64, f64)],
    edges: &[(usize, usize, EdgeLabel)],
    label: &GraphLabel,
) -> FlatLayout {
    if sizes.is_empty() {
        return FlatLayout {
            centers: Vec::new(),
            ranks: Vec::new(),
            orders: Vec::new(),
            width: 0.0,
            height: 0.0,
        };
    }

    let mut g = LayerGraph::default();
    for &size in sizes {
        let (w, h) = coordinate_system::adjust_size(label.rankdir, size);
        g.add_node(LayerNode::real(w, h));
    }
    for (v, w, lbl) in edges {
        if *v < sizes.len() && *w < sizes.len() {
            g.add_edge(*v, *w, lbl.minlen.max(1), lbl.weight);
        }
    }

    let reversed = acyclic::run(&mut g);
    if reversed > 0 {
        tracing::trace!(reversed, "reversed feedback edges");
    }
    rank::longest_path(&mut g);
    rank::lift_isolated(&mut g);
    rank::normalize(&mut g);
    order::run(&mut g, label.order_iterations);
    position::run(&mut g, label);

    let real = &g.nodes[..sizes.len()];
    let min_x = real.iter().map(|n| n.x - n.width / 2.0).fold(f64::INFINITY, f64::min);
    let max_x = real
        .iter()
        .map(|n| n.x + n.width / 2.0)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_y = real.iter().map(|n| n.y - n.height / 2.0).fold(f64::INFINITY, f64::min);
    let max_y = real
        .iter()
        .map(|n| n.y + n.height / 2.0)
        .fold(f64::NEG_INFINITY, f64::max);
    let (frame_w, frame_h) = (max_x - min_x, max_y - min_y);

    let centers = real
        .iter()
        .map(|n| coordinate_system::undo_point(label.rankdir, (n.x - min_x, n.y - min_y), frame_h))
        .collect();
    let (width, height) = coordinate_system::adjust_size(label.rankdir, (frame_w, frame_h));
    FlatLayout {
        centers,
        ranks: real.iter().map(|n| n.rank).collect(),
        orders: real.iter().map(|n| n.order).collect(),
        width,
        height,
    }
}
