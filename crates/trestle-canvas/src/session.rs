//! Reference controller wiring the canvas pieces together.
//!
//! The session owns the model snapshot and the layout record. Structural edits re-project the
//! visual set immediately (the previous geometry stays in place); placement changes only when a
//! layout outcome passes the request gate.

use crate::CanvasConfig;
use crate::adapter::{LayoutAdapter, LayoutEngine, LayoutOutcome, PendingLayout, layout_request};
use crate::collapse::{CollapseMode, CollapseState};
use crate::containment::{NodeRect, resolve_absolute};
use crate::debounce::{SaveDebouncer, SaveRequest};
use crate::drag::{DragMachine, DragState, DropPayload};
use crate::geom::{Point, Rect, Vector, rect};
use crate::handles::assign_edge_handles;
use crate::layout_record::{Layout, Viewport};
use crate::visual::{ProjectionCache, VisualEdge, VisualNode};
use futures::future;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::future::Future;
use std::time::Instant;
use trestle_core::{Architecture, DiagramType, EditIntent, Mutation, Patch};

/// A visual node with its resolved absolute position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    #[serde(flatten)]
    pub node: VisualNode,
    pub absolute_x: f64,
    pub absolute_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasSnapshot {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<VisualEdge>,
}

#[derive(Debug)]
pub struct EditorSession {
    architecture: Architecture,
    layout: Layout,
    diagram_type: DiagramType,
    config: CanvasConfig,
    cache: ProjectionCache,
    collapse: CollapseState,
    adapter: LayoutAdapter,
    drag: DragMachine,
    debouncer: SaveDebouncer,
    /// Current absolute geometry, from applied layouts and drags.
    placed: FxHashMap<String, Rect>,
    /// Unsnapped origin of the dragged node; what is shown and saved is this snapped to the grid.
    drag_anchor: Option<Point>,
    nodes: Vec<VisualNode>,
    edges: Vec<VisualEdge>,
    last_fallback: bool,
}

impl EditorSession {
    /// Starts a session; without a saved layout an empty one is created.
    pub fn new(
        architecture: Architecture,
        saved: Option<Layout>,
        diagram_type: DiagramType,
        config: CanvasConfig,
    ) -> Self {
        let layout = saved.unwrap_or_else(|| {
            let mut layout = Layout::empty(diagram_type);
            layout.grid_size = config.grid_size;
            layout
        });
        let collapse = CollapseState::from_layout(&layout);
        let debouncer = SaveDebouncer::new(config.save_debounce);
        let mut session = Self {
            architecture,
            layout,
            diagram_type,
            config,
            cache: ProjectionCache::default(),
            collapse,
            adapter: LayoutAdapter::default(),
            drag: DragMachine::new(),
            debouncer,
            placed: FxHashMap::default(),
            drag_anchor: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            last_fallback: false,
        };
        session.refresh();
        session
    }

    pub fn with_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.adapter = LayoutAdapter::new(engine);
        self
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[VisualEdge] {
        &self.edges
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn collapse_mode(&self, id: &str) -> CollapseMode {
        self.collapse.mode(id)
    }

    /// Whether the last applied layout came from the fallback grid.
    pub fn used_fallback(&self) -> bool {
        self.last_fallback
    }

    pub fn rects(&self) -> Vec<NodeRect> {
        resolve_absolute(&self.nodes)
    }

    pub fn snapshot(&self) -> CanvasSnapshot {
        let nodes = self
            .nodes
            .iter()
            .zip(self.rects())
            .map(|(node, r)| RenderNode {
                node: node.clone(),
                absolute_x: r.rect.origin.x,
                absolute_y: r.rect.origin.y,
            })
            .collect();
        CanvasSnapshot {
            nodes,
            edges: self.edges.clone(),
        }
    }

    /// Re-projects the model, positions nodes from the known geometry and re-routes edges.
    fn refresh(&mut self) {
        let projection = self
            .cache
            .get(&self.architecture, &self.config, &self.collapse)
            .clone();

        let absolute: FxHashMap<&str, Rect> = projection
            .nodes
            .iter()
            .filter_map(|n| {
                let r = self
                    .placed
                    .get(&n.id)
                    .copied()
                    .or_else(|| self.layout.pinned(&n.id))?;
                Some((n.id.as_str(), r))
            })
            .collect();

        let mut nodes = projection.nodes.clone();
        for n in &mut nodes {
            let Some(r) = absolute.get(n.id.as_str()) else {
                continue;
            };
            n.width = r.size.width;
            if !n.collapsed {
                n.height = r.size.height;
            }
            let (px, py) = n
                .parent_id
                .as_deref()
                .and_then(|p| absolute.get(p))
                .map(|p| (p.origin.x, p.origin.y))
                .unwrap_or((0.0, 0.0));
            n.x = r.origin.x - px;
            n.y = r.origin.y - py;
        }

        self.nodes = nodes;
        self.route_edges(&projection.edges);
    }

    fn route_edges(&mut self, edges: &[VisualEdge]) {
        let rects = resolve_absolute(&self.nodes);
        self.edges = assign_edge_handles(&rects, edges, &self.config);
    }

    /// Applies a mutation result and returns its patch batch for the persistence collaborator.
    pub fn apply_mutation(&mut self, mutation: Mutation) -> Vec<Patch> {
        if mutation.is_noop() {
            return Vec::new();
        }
        self.architecture = mutation.architecture;
        self.refresh();
        mutation.patches
    }

    pub fn edit(&mut self, intent: &EditIntent) -> Vec<Patch> {
        let mutation = intent.apply(&self.architecture);
        self.apply_mutation(mutation)
    }

    /// Starts a layout of the current visual set with the layout record as pins.
    pub fn request_layout(&self) -> PendingLayout<'_> {
        self.request_layout_with_deadline(future::pending())
    }

    pub fn request_layout_with_deadline<'a>(
        &'a self,
        deadline: impl Future<Output = ()> + Send + 'a,
    ) -> PendingLayout<'a> {
        let request = layout_request(&self.nodes, &self.edges, &self.config, self.diagram_type);
        self.adapter.begin(request, Some(&self.layout), deadline)
    }

    /// Applies `outcome` if it answers the latest request. Stale outcomes are dropped.
    pub fn apply_layout(&mut self, outcome: LayoutOutcome) -> bool {
        if !self.adapter.gate().is_current(outcome.request_id) {
            tracing::debug!(request = %outcome.request_id, "dropping superseded layout result");
            return false;
        }
        for p in &outcome.nodes {
            if self.collapse.is_collapsed(&p.id) {
                // Both the record and the live geometry keep the expanded height.
                let entry = self.layout.nodes.entry(p.id.clone()).or_default();
                entry.x = Some(p.x);
                entry.y = Some(p.y);
                entry.width = Some(p.width);
                let height = entry.height.unwrap_or(p.height);
                self.placed
                    .insert(p.id.clone(), rect(p.x, p.y, p.width, height));
            } else {
                self.placed
                    .insert(p.id.clone(), rect(p.x, p.y, p.width, p.height));
                self.layout.record_nodes(std::slice::from_ref(p));
            }
        }
        self.last_fallback = outcome.fallback;
        self.refresh();
        true
    }

    /// Requests a layout, waits for it and applies it.
    pub async fn relayout(&mut self) -> bool {
        let outcome = self.request_layout().future.await;
        self.apply_layout(outcome)
    }

    /// Toggles a container. Returns the new mode, or `None` for non-containers.
    pub fn toggle_collapse(&mut self, id: &str) -> Option<CollapseMode> {
        if !self.architecture.is_container(id) {
            return None;
        }
        let mode = self.collapse.toggle(id);
        self.layout.set_collapsed(id, mode == CollapseMode::Collapsed);
        self.refresh();
        Some(mode)
    }

    fn absolute_origin(&self, id: &str) -> Option<Point> {
        self.rects()
            .into_iter()
            .find(|r| r.id == id)
            .map(|r| r.rect.origin)
    }

    pub fn drag_start(&mut self, id: &str, detach: bool) -> bool {
        if !self.drag.start(&mut self.nodes, id, detach) {
            return false;
        }
        self.drag_anchor = self.absolute_origin(id);
        true
    }

    /// Moves the dragged node (and its subtree) and schedules a debounced position save.
    ///
    /// Only the dragged node's origin is snapped; its subtree follows by the same step, so
    /// offsets inside a dragged container are kept.
    pub fn drag_move(&mut self, delta: Vector, now: Instant) {
        let Some(id) = self.drag.dragged().map(str::to_string) else {
            return;
        };
        let (Some(anchor), Some(current)) = (self.drag_anchor, self.absolute_origin(&id)) else {
            return;
        };
        let anchor = anchor + delta;
        self.drag_anchor = Some(anchor);
        let step = self.layout.snap_point(anchor) - current;
        self.drag.move_by(&mut self.nodes, step);
        for r in resolve_absolute(&self.nodes) {
            let old = self.placed.get(&r.id);
            if old.is_some_and(|old| old.origin == r.rect.origin) {
                continue;
            }
            // A collapsed container keeps its expanded size.
            let size = old.map_or(r.rect.size, |old| old.size);
            self.layout.set_origin(&r.id, r.rect.origin.x, r.rect.origin.y);
            self.placed.insert(r.id, Rect::new(r.rect.origin, size));
        }
        self.debouncer.node_moved(now);
        let edges = self.edges.clone();
        self.route_edges(&edges);
    }

    /// Drops the dragged node at `point`, attaching it to the container underneath or detaching
    /// it from its current one.
    pub fn drag_end(&mut self, point: Point) -> Vec<Patch> {
        let mutation = self.drag.drop_at(&self.architecture, &self.nodes, point);
        self.drag.reset();
        self.drag_anchor = None;
        let patches = self.apply_mutation(mutation);
        if patches.is_empty() {
            self.refresh();
        }
        patches
    }

    /// Creates a node from a palette drop, centered on `point`.
    pub fn drop_payload(&mut self, payload: &DropPayload, point: Point) -> Vec<Patch> {
        let (id, mutation) =
            payload.create(&self.architecture, self.diagram_type, &self.nodes, point);
        let size = self.config.node_size(payload.node_kind);
        let origin = point - Vector::new(size.width / 2.0, size.height / 2.0);
        self.layout.move_node(&id, origin.x, origin.y);
        self.layout.resize_node(&id, size.width, size.height);
        if let Some(r) = self.layout.pinned(&id) {
            self.placed.insert(id, r);
        }
        self.apply_mutation(mutation)
    }

    /// Stores the viewport; pan/zoom is saved once per gesture.
    pub fn viewport_move_end(&mut self, viewport: Viewport) -> SaveRequest {
        self.layout.set_viewport(viewport);
        SaveRequest::Viewport
    }

    pub fn poll_save(&mut self, now: Instant) -> Option<SaveRequest> {
        self.debouncer.poll(now)
    }

    pub fn flush_save(&mut self) -> Option<SaveRequest> {
        self.debouncer.flush()
    }
}
