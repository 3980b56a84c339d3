//! Coordinate assignment for an ordered layering (top-to-bottom frame).
//!
//! `y` is fixed per rank from the tallest member. `x` starts packed and is then pulled toward
//! the median of each node's neighbours in the adjacent rank, alternating downward and upward
//! passes; every pass keeps the in-rank order and minimum separation.

use crate::GraphLabel;
use crate::layer::LayerGraph;

fn separation(g: &LayerGraph, a: usize, b: usize, label: &GraphLabel) -> f64 {
    let sep = |v: usize| {
        if g.nodes[v].dummy {
            label.edgesep
        } else {
            label.nodesep
        }
    };
    g.nodes[a].width / 2.0 + (sep(a) + sep(b)) / 2.0 + g.nodes[b].width / 2.0
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Places `layer` as close to `desired` as separation allows: pack left-to-right, then shift
/// the whole row by the mean residual.
fn place_layer(g: &mut LayerGraph, layer: &[usize], desired: &[f64], label: &GraphLabel) {
    let mut xs: Vec<f64> = Vec::with_capacity(layer.len());
    for (i, &v) in layer.iter().enumerate() {
        let x = if i == 0 {
            desired[0]
        } else {
            desired[i].max(xs[i - 1] + separation(g, layer[i - 1], v, label))
        };
        xs.push(x);
    }
    if xs.is_empty() {
        return;
    }
    let shift = xs
        .iter()
        .zip(desired)
        .map(|(x, d)| d - x)
        .sum::<f64>()
        / xs.len() as f64;
    for (&v, x) in layer.iter().zip(xs) {
        g.nodes[v].x = x + shift;
    }
}

pub fn run(g: &mut LayerGraph, label: &GraphLabel) {
    let layering = g.layering();

    let mut y_cursor = 0.0;
    for layer in &layering {
        let height = layer
            .iter()
            .map(|&v| g.nodes[v].height)
            .fold(0.0_f64, f64::max);
        for &v in layer {
            g.nodes[v].y = y_cursor + height / 2.0;
        }
        y_cursor += height + label.ranksep;
    }

    for layer in &layering {
        let desired: Vec<f64> = vec![0.0; layer.len()];
        place_layer(g, layer, &desired, label);
    }

    for _ in 0..label.order_iterations.max(1) {
        for i in 1..layering.len() {
            align_to_neighbours(g, &layering[i], true, label);
        }
        for i in (0..layering.len().saturating_sub(1)).rev() {
            align_to_neighbours(g, &layering[i], false, label);
        }
    }
}

fn align_to_neighbours(g: &mut LayerGraph, layer: &[usize], downward: bool, label: &GraphLabel) {
    let desired: Vec<f64> = layer
        .iter()
        .map(|&v| {
            let mut xs: Vec<f64> = if downward {
                g.in_edges(v).map(|e| g.nodes[e.v].x).collect()
            } else {
                g.out_edges(v).map(|e| g.nodes[e.w].x).collect()
            };
            median(&mut xs).unwrap_or(g.nodes[v].x)
        })
        .collect();
    place_layer(g, layer, &desired, label);
}
