//! Greedy per-edge connection-side assignment.
//!
//! Each endpoint takes the side facing the other endpoint (four 90° sectors around the center,
//! y pointing down). A per-node, per-side usage counter is shared across the batch; once a side
//! carries `max_edges_per_side` edges the perpendicular side toward the other endpoint is tried
//! and taken only if it is less used. One pass, O(edges).

use crate::CanvasConfig;
use crate::containment::NodeRect;
use crate::visual::VisualEdge;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Side facing along `(dx, dy)`: right `[-45°, 45°]`, bottom `(45°, 135°]`,
    /// top `[-135°, -45°)`, left otherwise.
    pub fn facing(dx: f64, dy: f64) -> Self {
        let angle = dy.atan2(dx).to_degrees();
        if (-45.0..=45.0).contains(&angle) {
            Side::Right
        } else if angle > 45.0 && angle <= 135.0 {
            Side::Bottom
        } else if (-135.0..-45.0).contains(&angle) {
            Side::Top
        } else {
            Side::Left
        }
    }

    /// The perpendicular alternative, picked by the sign of the cross-axis delta.
    pub fn perpendicular(self, dx: f64, dy: f64) -> Self {
        if self.is_horizontal() {
            if dy >= 0.0 { Side::Bottom } else { Side::Top }
        } else if dx >= 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    }

    pub fn source_handle(self) -> String {
        format!("{}-src", self.as_str())
    }

    pub fn target_handle(self) -> String {
        format!("{}-tgt", self.as_str())
    }
}

#[derive(Debug, Default)]
struct SideUsage<'a> {
    counts: FxHashMap<(&'a str, Side), usize>,
}

impl<'a> SideUsage<'a> {
    fn get(&self, node: &'a str, side: Side) -> usize {
        self.counts.get(&(node, side)).copied().unwrap_or(0)
    }

    fn take(&mut self, node: &'a str, primary: Side, dx: f64, dy: f64, max: usize) -> Side {
        let used = self.get(node, primary);
        let side = if used >= max {
            let alternative = primary.perpendicular(dx, dy);
            if self.get(node, alternative) < used {
                alternative
            } else {
                primary
            }
        } else {
            primary
        };
        *self.counts.entry((node, side)).or_default() += 1;
        side
    }
}

/// Returns `edges` with `source_handle`/`target_handle` filled in. Edges whose endpoints are not
/// in `nodes` are returned unchanged.
pub fn assign_edge_handles(
    nodes: &[NodeRect],
    edges: &[VisualEdge],
    config: &CanvasConfig,
) -> Vec<VisualEdge> {
    let by_id: FxHashMap<&str, &NodeRect> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut usage = SideUsage::default();
    let max = config.max_edges_per_side;

    edges
        .iter()
        .map(|edge| {
            let mut out = edge.clone();
            let (Some(&source), Some(&target)) =
                (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str()))
            else {
                return out;
            };
            let (sc, tc) = (source.center(), target.center());
            let (dx, dy) = (tc.x - sc.x, tc.y - sc.y);
            let primary = Side::facing(dx, dy);

            let source_side = usage.take(source.id.as_str(), primary, dx, dy, max);
            let target_side = usage.take(target.id.as_str(), primary.opposite(), -dx, -dy, max);
            out.source_handle = Some(source_side.source_handle());
            out.target_handle = Some(target_side.target_handle());
            out
        })
        .collect()
}
