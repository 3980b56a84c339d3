//! Deterministic grid placement used when the layout engine fails.
//!
//! Each nesting level is a grid filled row by row in input order. Containers grow to fit their
//! grid plus padding and header, innermost first.

use crate::adapter::{LayoutOptions, PlacedNode};
use crate::hierarchy::Hierarchy;
use crate::visual::VisualNode;
use rustc_hash::FxHashMap;

struct Cell {
    width: f64,
    height: f64,
    /// Top-left relative to the parent's content origin.
    x: f64,
    y: f64,
}

fn place_level(
    h: &Hierarchy<'_>,
    levels: &FxHashMap<Option<usize>, Vec<usize>>,
    level: Option<usize>,
    options: &LayoutOptions,
    cells: &mut [Option<Cell>],
) -> (f64, f64) {
    let Some(members) = levels.get(&level) else {
        return (0.0, 0.0);
    };

    let mut sizes: Vec<(f64, f64)> = Vec::with_capacity(members.len());
    for &i in members {
        let n = &h.nodes[i];
        if levels.contains_key(&Some(i)) {
            let (cw, ch) = place_level(h, levels, Some(i), options, cells);
            sizes.push((
                n.width.max(cw + 2.0 * options.padding),
                n.height.max(ch + 2.0 * options.padding + options.header),
            ));
        } else {
            sizes.push((n.width, n.height));
        }
    }

    let columns = options.fallback.columns.max(1);
    let widest = sizes.iter().map(|s| s.0).fold(0.0_f64, f64::max);
    let tallest = sizes.iter().map(|s| s.1).fold(0.0_f64, f64::max);
    let pitch_x = options
        .fallback
        .column_spacing
        .max(widest + options.node_spacing);
    let pitch_y = options.fallback.row_spacing.max(tallest + options.node_spacing);

    let mut extent = (0.0_f64, 0.0_f64);
    for (slot, (&i, &(width, height))) in members.iter().zip(&sizes).enumerate() {
        let (col, row) = (slot % columns, slot / columns);
        let (x, y) = (col as f64 * pitch_x, row as f64 * pitch_y);
        extent = (extent.0.max(x + width), extent.1.max(y + height));
        cells[i] = Some(Cell {
            width,
            height,
            x,
            y,
        });
    }
    extent
}

pub fn fallback_grid(nodes: &[VisualNode], options: &LayoutOptions) -> Vec<PlacedNode> {
    let h = Hierarchy::new(nodes);
    let levels = h.visible_levels();
    let mut cells: Vec<Option<Cell>> = nodes.iter().map(|_| None).collect();
    place_level(&h, &levels, None, options, &mut cells);

    // Parents precede their children in `order`, so absolute positions resolve in one pass.
    let mut origin: Vec<Option<(f64, f64)>> = vec![None; nodes.len()];
    let mut order: Vec<usize> = levels.get(&None).cloned().unwrap_or_default();
    let mut cursor = 0;
    while cursor < order.len() {
        let i = order[cursor];
        cursor += 1;
        let base = match h.parent[i].and_then(|p| origin[p]) {
            Some((px, py)) => (px + options.padding, py + options.padding + options.header),
            None => (options.margin, options.margin),
        };
        if let Some(cell) = &cells[i] {
            origin[i] = Some((base.0 + cell.x, base.1 + cell.y));
        }
        if let Some(children) = levels.get(&Some(i)) {
            order.extend(children);
        }
    }

    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| match (&cells[i], origin[i]) {
            (Some(cell), Some((x, y))) => PlacedNode {
                id: n.id.clone(),
                x,
                y,
                width: cell.width,
                height: cell.height,
            },
            _ => {
                let anchor = h.representative(i);
                let (x, y) = match origin[anchor] {
                    Some((ax, ay)) if anchor != i => {
                        (ax + options.padding, ay + options.padding + options.header)
                    }
                    _ => (options.margin, options.margin),
                };
                PlacedNode {
                    id: n.id.clone(),
                    x,
                    y,
                    width: n.width,
                    height: n.height,
                }
            }
        })
        .collect()
}
