//! Layout Algorithm Adapter.
//!
//! Wraps a [`LayoutEngine`] (by default the layered `otter` engine) and guarantees a complete
//! placement: saved geometry pins nodes, auto-placed descendants of a pinned container follow
//! it, and any engine failure (error, panic, missed deadline) degrades to the fallback grid.
//! Every call is stamped with a [`LayoutRequestId`] issued synchronously, so callers can drop
//! results that a newer request has superseded.

use crate::config::{CanvasConfig, FallbackGrid};
use crate::error::LayoutError;
use crate::fallback::fallback_grid;
use crate::geom::{Rect, rect};
use crate::hierarchy::Hierarchy;
use crate::layout_record::Layout;
use crate::visual::{VisualEdge, VisualNode};
use futures::FutureExt;
use futures::future::{self, BoxFuture, Either};
use otter::{Graph, GraphLabel, NodeLabel, RankDir};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use trestle_core::DiagramType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayoutRequestId(u64);

impl LayoutRequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayoutRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Request-generation counter. A result is current only if no newer request has been issued.
#[derive(Debug, Default)]
pub struct LayoutGate {
    latest: AtomicU64,
}

impl LayoutGate {
    pub fn issue(&self) -> LayoutRequestId {
        LayoutRequestId(self.latest.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn latest(&self) -> Option<LayoutRequestId> {
        match self.latest.load(Ordering::Relaxed) {
            0 => None,
            id => Some(LayoutRequestId(id)),
        }
    }

    pub fn is_current(&self, id: LayoutRequestId) -> bool {
        let latest = self.latest.load(Ordering::Relaxed);
        let current = latest == id.0;
        tracing::trace!(request = %id, latest, current, "layout gate");
        current
    }
}

/// Absolute top-left geometry of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedNode {
    fn from_rect(id: &str, r: &Rect) -> Self {
        Self {
            id: id.to_string(),
            x: r.origin.x,
            y: r.origin.y,
            width: r.size.width,
            height: r.size.height,
        }
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub rankdir: RankDir,
    pub node_spacing: f64,
    pub rank_spacing: f64,
    pub padding: f64,
    pub header: f64,
    pub margin: f64,
    pub fallback: FallbackGrid,
}

impl LayoutOptions {
    pub fn for_diagram(config: &CanvasConfig, diagram_type: DiagramType) -> Self {
        let direction = config.direction(diagram_type);
        Self {
            rankdir: direction.rankdir,
            node_spacing: direction.node_spacing,
            rank_spacing: direction.rank_spacing,
            padding: config.container_padding,
            header: config.header_height,
            margin: config.margin,
            fallback: config.fallback.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
    pub options: LayoutOptions,
}

/// An automatic placement algorithm. Must place every node of the request (absolute top-left).
pub trait LayoutEngine: Send + Sync {
    fn run<'a>(
        &'a self,
        request: &'a LayoutRequest,
    ) -> BoxFuture<'a, Result<Vec<PlacedNode>, LayoutError>>;
}

/// Compound layered layout via `otter`. Collapsed containers are laid out as leaves; their
/// hidden descendants are parked inside them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredEngine;

impl LayeredEngine {
    pub fn layout_sync(&self, request: &LayoutRequest) -> Result<Vec<PlacedNode>, LayoutError> {
        let o = &request.options;
        let mut g = Graph::new(GraphLabel {
            rankdir: o.rankdir,
            nodesep: o.node_spacing,
            ranksep: o.rank_spacing,
            marginx: o.margin,
            marginy: o.margin,
            cluster_padding: o.padding,
            cluster_header: o.header,
            ..Default::default()
        });

        let h = Hierarchy::new(&request.nodes);
        for n in request.nodes.iter().filter(|n| !n.hidden) {
            g.set_node(n.id.as_str(), NodeLabel::sized(n.width, n.height));
        }
        for (i, n) in request.nodes.iter().enumerate() {
            if let (false, Some(p)) = (n.hidden, h.parent[i]) {
                g.set_parent(n.id.as_str(), request.nodes[p].id.as_str());
            }
        }

        let index: FxHashMap<&str, usize> = request
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
        for e in &request.edges {
            let (Some(&v), Some(&w)) = (index.get(e.source.as_str()), index.get(e.target.as_str()))
            else {
                continue;
            };
            let (v, w) = (h.representative(v), h.representative(w));
            if v == w || request.nodes[v].hidden || request.nodes[w].hidden {
                continue;
            }
            if seen.insert((v, w)) {
                g.set_edge(request.nodes[v].id.as_str(), request.nodes[w].id.as_str());
            }
        }

        otter::layout(&mut g)?;

        let mut placed: Vec<Option<PlacedNode>> = vec![None; request.nodes.len()];
        for (i, n) in request.nodes.iter().enumerate() {
            if n.hidden {
                continue;
            }
            let label = g
                .node(&n.id)
                .ok_or_else(|| LayoutError::Engine(format!("node `{}` was not placed", n.id)))?;
            let (Some(cx), Some(cy)) = (label.x, label.y) else {
                return Err(LayoutError::Engine(format!("node `{}` has no position", n.id)));
            };
            placed[i] = Some(PlacedNode {
                id: n.id.clone(),
                x: cx - label.width / 2.0,
                y: cy - label.height / 2.0,
                width: label.width,
                height: label.height,
            });
        }

        let mut out = Vec::with_capacity(request.nodes.len());
        for (i, n) in request.nodes.iter().enumerate() {
            if let Some(p) = &placed[i] {
                out.push(p.clone());
                continue;
            }
            let anchor = h.representative(i);
            let (x, y) = match &placed[anchor] {
                Some(a) if anchor != i => (a.x + o.padding, a.y + o.padding + o.header),
                _ => (o.margin, o.margin),
            };
            out.push(PlacedNode {
                id: n.id.clone(),
                x,
                y,
                width: n.width,
                height: n.height,
            });
        }
        Ok(out)
    }
}

impl LayoutEngine for LayeredEngine {
    fn run<'a>(
        &'a self,
        request: &'a LayoutRequest,
    ) -> BoxFuture<'a, Result<Vec<PlacedNode>, LayoutError>> {
        async move { self.layout_sync(request) }.boxed()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOutcome {
    pub request_id: LayoutRequestId,
    /// Every input node, in input order.
    pub nodes: Vec<PlacedNode>,
    /// Whether the fallback grid replaced the engine's placement.
    pub fallback: bool,
}

impl LayoutOutcome {
    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

pub struct PendingLayout<'a> {
    pub request_id: LayoutRequestId,
    pub future: BoxFuture<'a, LayoutOutcome>,
}

pub struct LayoutAdapter {
    engine: Arc<dyn LayoutEngine>,
    gate: LayoutGate,
}

impl Default for LayoutAdapter {
    fn default() -> Self {
        Self::new(LayeredEngine)
    }
}

impl fmt::Debug for LayoutAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutAdapter")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Engine output in input order; an incomplete or non-finite placement is an engine failure.
fn complete(nodes: &[VisualNode], placed: Vec<PlacedNode>) -> Result<Vec<PlacedNode>, LayoutError> {
    let mut by_id: FxHashMap<String, PlacedNode> =
        placed.into_iter().map(|p| (p.id.clone(), p)).collect();
    nodes
        .iter()
        .map(|n| match by_id.remove(&n.id) {
            Some(p) if p.is_finite() => Ok(p),
            Some(_) => Err(LayoutError::Engine(format!("node `{}` has a non-finite placement", n.id))),
            None => Err(LayoutError::Engine(format!("node `{}` was not placed", n.id))),
        })
        .collect()
}

/// Overrides auto placement with pins. An auto-placed node below a pinned container keeps its
/// offset from the nearest pinned ancestor, so it moves with that ancestor.
///
/// A pinned container keeps its saved size even when the engine needed more room: children are
/// neither clipped nor is the container grown, so they may overflow until the user resizes it.
fn merge_pins(
    nodes: &[VisualNode],
    auto: Vec<PlacedNode>,
    pins: &FxHashMap<String, Rect>,
) -> Vec<PlacedNode> {
    if pins.is_empty() {
        return auto;
    }
    let h = Hierarchy::new(nodes);
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            if let Some(r) = pins.get(&n.id) {
                return PlacedNode::from_rect(&n.id, r);
            }
            let own = &auto[i];
            let mut seen: FxHashSet<usize> = FxHashSet::default();
            let mut cur = h.parent[i];
            while let Some(p) = cur {
                if !seen.insert(p) {
                    break;
                }
                if let Some(r) = pins.get(&nodes[p].id) {
                    let anchor = &auto[p];
                    return PlacedNode {
                        id: n.id.clone(),
                        x: r.origin.x + (own.x - anchor.x),
                        y: r.origin.y + (own.y - anchor.y),
                        width: own.width,
                        height: own.height,
                    };
                }
                cur = h.parent[p];
            }
            own.clone()
        })
        .collect()
}

/// Saved geometry that pins `n`. A collapsed container is pinned by origin and width only; it
/// keeps its collapsed height.
fn pin_for(layout: &Layout, n: &VisualNode) -> Option<Rect> {
    if n.collapsed {
        let g = layout.nodes.get(&n.id)?;
        let (x, y, w) = (g.x?, g.y?, g.width?);
        let valid = [x, y, w].iter().all(|v| v.is_finite()) && w >= 0.0;
        return valid.then(|| rect(x, y, w, n.height));
    }
    layout.pinned(&n.id)
}

impl LayoutAdapter {
    pub fn new(engine: impl LayoutEngine + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            gate: LayoutGate::default(),
        }
    }

    pub fn gate(&self) -> &LayoutGate {
        &self.gate
    }

    /// Issues a request id now and returns the placement future. `deadline` resolving first
    /// counts as an engine failure.
    pub fn begin<'a>(
        &'a self,
        mut request: LayoutRequest,
        saved: Option<&Layout>,
        deadline: impl Future<Output = ()> + Send + 'a,
    ) -> PendingLayout<'a> {
        let request_id = self.gate.issue();

        let pins: FxHashMap<String, Rect> = match saved {
            Some(layout) => request
                .nodes
                .iter()
                .filter_map(|n| pin_for(layout, n).map(|r| (n.id.clone(), r)))
                .collect(),
            None => FxHashMap::default(),
        };
        // Pinned nodes still take part in the layout graph, at their saved size.
        for n in &mut request.nodes {
            if let Some(r) = pins.get(&n.id) {
                n.width = r.size.width;
                n.height = r.size.height;
            }
        }

        let future = async move {
            let placed = {
                let run = AssertUnwindSafe(async { self.engine.run(&request).await }).catch_unwind();
                let run = std::pin::pin!(run);
                let deadline = std::pin::pin!(deadline);
                match future::select(run, deadline).await {
                    Either::Left((Ok(result), _)) => result,
                    Either::Left((Err(payload), _)) => {
                        Err(LayoutError::Panicked(panic_message(payload.as_ref())))
                    }
                    Either::Right(((), _)) => Err(LayoutError::TimedOut),
                }
            };

            let (auto, fallback) = match placed.and_then(|p| complete(&request.nodes, p)) {
                Ok(auto) => (auto, false),
                Err(err) => {
                    tracing::warn!(
                        request = %request_id,
                        error = %err,
                        "layout engine failed; using fallback grid"
                    );
                    (fallback_grid(&request.nodes, &request.options), true)
                }
            };

            LayoutOutcome {
                request_id,
                nodes: merge_pins(&request.nodes, auto, &pins),
                fallback,
            }
        };

        PendingLayout {
            request_id,
            future: future.boxed(),
        }
    }

    /// [`LayoutAdapter::begin`] without access to the request id before completion.
    pub fn layout<'a>(
        &'a self,
        request: LayoutRequest,
        saved: Option<&Layout>,
        deadline: impl Future<Output = ()> + Send + 'a,
    ) -> BoxFuture<'a, LayoutOutcome> {
        self.begin(request, saved, deadline).future
    }
}

/// Builds the request for a projection.
pub fn layout_request(
    nodes: &[VisualNode],
    edges: &[VisualEdge],
    config: &CanvasConfig,
    diagram_type: DiagramType,
) -> LayoutRequest {
    LayoutRequest {
        nodes: nodes.to_vec(),
        edges: edges.to_vec(),
        options: LayoutOptions::for_diagram(config, diagram_type),
    }
}
