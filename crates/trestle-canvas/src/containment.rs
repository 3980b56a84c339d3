//! Containment detection over absolute node rectangles.

use crate::geom::{Point, Rect, rect, rect_contains};
use crate::visual::VisualNode;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRect {
    pub id: String,
    /// Absolute canvas rectangle.
    pub rect: Rect,
    pub is_container: bool,
    pub hidden: bool,
}

impl NodeRect {
    pub fn center(&self) -> Point {
        self.rect.center()
    }
}

/// Resolves parent-relative visual positions into absolute rectangles, in input order.
///
/// A node whose parent is unknown (or whose parent chain loops) is treated as top-level.
pub fn resolve_absolute(nodes: &[VisualNode]) -> Vec<NodeRect> {
    let by_id: FxHashMap<&str, &VisualNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    nodes
        .iter()
        .map(|n| {
            let (mut x, mut y) = (n.x, n.y);
            let mut seen: FxHashSet<&str> = FxHashSet::default();
            seen.insert(n.id.as_str());
            let mut cur = n.parent_id.as_deref();
            while let Some(parent) = cur.and_then(|id| by_id.get(id)) {
                if !seen.insert(parent.id.as_str()) {
                    break;
                }
                x += parent.x;
                y += parent.y;
                cur = parent.parent_id.as_deref();
            }
            NodeRect {
                id: n.id.clone(),
                rect: rect(x, y, n.width, n.height),
                is_container: n.is_container,
                hidden: n.hidden,
            }
        })
        .collect()
}

/// The smallest-area visible container whose rectangle contains `point` (edges inclusive),
/// skipping `exclude_id`. Equal areas resolve to the first candidate in input order.
pub fn find_container_at_point<'a>(
    nodes: &'a [NodeRect],
    point: Point,
    exclude_id: Option<&str>,
) -> Option<&'a NodeRect> {
    let mut best: Option<&NodeRect> = None;
    for n in nodes {
        if !n.is_container || n.hidden || Some(n.id.as_str()) == exclude_id {
            continue;
        }
        if !rect_contains(&n.rect, point) {
            continue;
        }
        if best.is_none_or(|b| n.rect.area() < b.rect.area()) {
            best = Some(n);
        }
    }
    best
}
