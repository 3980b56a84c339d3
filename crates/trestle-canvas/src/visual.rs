//! Visual projection of the architecture model.
//!
//! Visual nodes and edges are always derived from the model (never edited directly), so the model
//! stays the single source of truth. [`ProjectionCache`] memoizes the projection on a content
//! hash of the model and the collapse state.

use crate::CanvasConfig;
use crate::collapse::CollapseState;
use rustc_hash::FxHasher;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use trestle_core::{Architecture, NodeKind, RelationshipKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualNode {
    pub id: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub is_container: bool,
    /// Top-left corner, relative to the parent's top-left when `parent_id` is set.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub collapsed: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualEdgeKind {
    Connects,
    Interacts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualEdge {
    pub id: String,
    pub relationship_id: String,
    pub kind: VisualEdgeKind,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

impl Projection {
    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Projects the model: one visual node per model node (containment from `composed-of`), one edge
/// per `connects` relationship and one edge per member of an `interacts` relationship
/// (`"{relationship}::{node}"`). `composed-of` produces parent links, not edges.
pub fn project(arch: &Architecture, config: &CanvasConfig, collapse: &CollapseState) -> Projection {
    let mut nodes: Vec<VisualNode> = arch
        .nodes
        .iter()
        .map(|n| {
            let parent_id = arch
                .container_of(&n.unique_id)
                .filter(|p| arch.has_node(p) && !arch.is_descendant(p, &n.unique_id))
                .map(str::to_string);
            let size = config.node_size(n.node_type);
            VisualNode {
                id: n.unique_id.clone(),
                kind: n.node_type,
                parent_id,
                is_container: arch.is_container(&n.unique_id),
                x: 0.0,
                y: 0.0,
                width: size.width,
                height: size.height,
                collapsed: false,
                hidden: false,
            }
        })
        .collect();
    collapse.apply(&mut nodes, config.header_height);

    let mut edges: Vec<VisualEdge> = Vec::new();
    for rel in &arch.relationships {
        match &rel.relationship_type {
            RelationshipKind::Connects { source, target, .. } => {
                if arch.has_node(source) && arch.has_node(target) {
                    edges.push(VisualEdge {
                        id: rel.unique_id.clone(),
                        relationship_id: rel.unique_id.clone(),
                        kind: VisualEdgeKind::Connects,
                        source: source.clone(),
                        target: target.clone(),
                        label: rel.protocol.clone(),
                        source_handle: None,
                        target_handle: None,
                    });
                }
            }
            RelationshipKind::Interacts { actor, nodes: targets } => {
                if !arch.has_node(actor) {
                    continue;
                }
                for target in targets.iter().filter(|t| arch.has_node(t)) {
                    edges.push(VisualEdge {
                        id: format!("{}::{target}", rel.unique_id),
                        relationship_id: rel.unique_id.clone(),
                        kind: VisualEdgeKind::Interacts,
                        source: actor.clone(),
                        target: target.clone(),
                        label: rel.protocol.clone(),
                        source_handle: None,
                        target_handle: None,
                    });
                }
            }
            RelationshipKind::ComposedOf { .. } => {}
        }
    }

    Projection { nodes, edges }
}

fn content_hash(arch: &Architecture, collapse: &CollapseState) -> Option<u64> {
    let bytes = serde_json::to_vec(arch).ok()?;
    let mut hasher = FxHasher::default();
    bytes.hash(&mut hasher);
    collapse.hash(&mut hasher);
    Some(hasher.finish())
}

#[derive(Debug, Default)]
pub struct ProjectionCache {
    key: Option<(u64, CanvasConfig)>,
    projection: Projection,
    hits: usize,
}

impl ProjectionCache {
    pub fn get(
        &mut self,
        arch: &Architecture,
        config: &CanvasConfig,
        collapse: &CollapseState,
    ) -> &Projection {
        let hash = content_hash(arch, collapse);
        let fresh = match (&self.key, hash) {
            (Some((cached, cached_config)), Some(hash)) => {
                *cached == hash && cached_config == config
            }
            _ => false,
        };
        if fresh {
            self.hits += 1;
        } else {
            self.projection = project(arch, config, collapse);
            self.key = hash.map(|h| (h, config.clone()));
        }
        &self.projection
    }

    /// Number of lookups answered without re-projecting.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
