//! Drag/reparent state machine and palette drop payloads.
//!
//! `Idle -> Dragging -> {DroppedInContainer, DroppedOrphan}`. A modifier-held start on a
//! contained node passes through `Detaching` first: the node is re-expressed in absolute
//! coordinates and its parent link is cleared on the visual side only. The model changes at drop
//! time, when geometry decides between attaching to a container and detaching.

use crate::containment::{NodeRect, find_container_at_point, resolve_absolute};
use crate::geom::{Point, Vector};
use crate::visual::VisualNode;
use serde::{Deserialize, Serialize};
use trestle_core::mutation::{self, Mutation};
use trestle_core::{Architecture, DiagramType, NodeKind, create_default_node};

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Detaching {
        node_id: String,
    },
    Dragging {
        node_id: String,
        detached: bool,
    },
    DroppedInContainer {
        node_id: String,
        container_id: String,
    },
    DroppedOrphan {
        node_id: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragMachine {
    state: DragState,
}

impl Default for DragMachine {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
        }
    }
}

/// Visible containers a drop could land in, minus the dragged node's own subtree.
fn drop_targets(arch: &Architecture, nodes: &[VisualNode], node_id: &str) -> Vec<NodeRect> {
    resolve_absolute(nodes)
        .into_iter()
        .filter(|r| r.id != node_id && !arch.is_descendant(&r.id, node_id))
        .collect()
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn dragged(&self) -> Option<&str> {
        match &self.state {
            DragState::Detaching { node_id } | DragState::Dragging { node_id, .. } => {
                Some(node_id.as_str())
            }
            _ => None,
        }
    }

    /// Starts dragging `node_id`. With `detach` held on a contained node, its visual position
    /// becomes absolute and its parent link is cleared. Returns `false` if a drag is already
    /// running or the node is unknown.
    pub fn start(&mut self, nodes: &mut [VisualNode], node_id: &str, detach: bool) -> bool {
        if self.dragged().is_some() {
            return false;
        }
        let Some(idx) = nodes.iter().position(|n| n.id == node_id) else {
            return false;
        };

        if detach && nodes[idx].parent_id.is_some() {
            let absolute = resolve_absolute(nodes)[idx].rect.origin;
            let node = &mut nodes[idx];
            node.x = absolute.x;
            node.y = absolute.y;
            node.parent_id = None;
            self.state = DragState::Detaching {
                node_id: node_id.to_string(),
            };
        } else {
            self.state = DragState::Dragging {
                node_id: node_id.to_string(),
                detached: false,
            };
        }
        true
    }

    /// Moves the dragged node by `delta`; descendants follow through their relative positions.
    pub fn move_by(&mut self, nodes: &mut [VisualNode], delta: Vector) {
        let (node_id, detached) = match &self.state {
            DragState::Detaching { node_id } => (node_id.clone(), true),
            DragState::Dragging { node_id, detached } => (node_id.clone(), *detached),
            _ => return,
        };
        if let Some(node) = nodes.iter_mut().find(|n| n.id == node_id) {
            node.x += delta.x;
            node.y += delta.y;
        }
        self.state = DragState::Dragging { node_id, detached };
    }

    /// Resolves the drop at `point` into a model edit. Without an active drag this is a no-op.
    pub fn drop_at(&mut self, arch: &Architecture, nodes: &[VisualNode], point: Point) -> Mutation {
        let Some(node_id) = self.dragged().map(str::to_string) else {
            return Mutation::unchanged(arch);
        };
        let targets = drop_targets(arch, nodes, &node_id);
        match find_container_at_point(&targets, point, Some(&node_id)) {
            Some(container) => {
                let container_id = container.id.clone();
                let m = mutation::add_node_to_container(arch, &node_id, &container_id);
                self.state = DragState::DroppedInContainer {
                    node_id,
                    container_id,
                };
                m
            }
            None => {
                let m = mutation::remove_node_from_any_container(arch, &node_id);
                self.state = DragState::DroppedOrphan { node_id };
                m
            }
        }
    }

    /// Abandons the drag. Speculative visual changes are undone by re-projecting.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

/// Palette payload: both kinds are required for a drop to create a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPayload {
    pub visual_kind: String,
    pub node_kind: NodeKind,
}

impl DropPayload {
    pub fn from_entries(visual_kind: Option<&str>, node_kind: Option<&str>) -> Option<Self> {
        let visual_kind = visual_kind.map(str::trim).filter(|s| !s.is_empty())?;
        let node_kind = NodeKind::parse(node_kind?)?;
        Some(Self {
            visual_kind: visual_kind.to_string(),
            node_kind,
        })
    }

    /// Parses `{"visualKind": ..., "nodeKind": ...}`; anything else yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        Self::from_entries(
            value.get("visualKind").and_then(|v| v.as_str()),
            value.get("nodeKind").and_then(|v| v.as_str()),
        )
    }

    /// Creates a default node for this payload, placed into the container under `point` if any.
    /// Returns the new node id with the edit.
    pub fn create(
        &self,
        arch: &Architecture,
        diagram_type: DiagramType,
        nodes: &[VisualNode],
        point: Point,
    ) -> (String, Mutation) {
        let node = create_default_node(diagram_type, self.node_kind);
        let id = node.unique_id.clone();
        let rects = resolve_absolute(nodes);
        let container = find_container_at_point(&rects, point, None).map(|r| r.id.clone());

        let m = mutation::add_node(arch, node);
        let m = match container {
            Some(container_id) => m.then(|a| mutation::add_node_to_container(a, &id, &container_id)),
            None => m,
        };
        (id, m)
    }
}
