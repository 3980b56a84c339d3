//! Compound directed multigraph container.
//!
//! Nodes keep insertion order, which every stage uses as its deterministic tie-breaker.

use crate::{EdgeLabel, GraphLabel, NodeLabel};
use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub v: String,
    pub w: String,
    pub label: EdgeLabel,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    label: GraphLabel,
    nodes: IndexMap<String, NodeLabel>,
    edges: Vec<Edge>,
    parent: HashMap<String, String>,
    children: IndexMap<String, Vec<String>>,
}

impl Graph {
    pub fn new(label: GraphLabel) -> Self {
        Self {
            label,
            ..Default::default()
        }
    }

    pub fn graph(&self) -> &GraphLabel {
        &self.label
    }

    pub fn graph_mut(&mut self) -> &mut GraphLabel {
        &mut self.label
    }

    pub fn set_node(&mut self, id: impl Into<String>, label: NodeLabel) -> &mut Self {
        self.nodes.insert(id.into(), label);
        self
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&NodeLabel> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeLabel> {
        self.nodes.get_mut(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_with_label(v, w, EdgeLabel::default())
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: EdgeLabel,
    ) -> &mut Self {
        self.edges.push(Edge {
            v: v.into(),
            w: w.into(),
            label,
        });
        self
    }

    pub fn set_path(&mut self, nodes: &[&str]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nests `child` under `parent`, replacing any previous parent.
    pub fn set_parent(&mut self, child: impl Into<String>, parent: impl Into<String>) -> &mut Self {
        let child = child.into();
        let parent = parent.into();
        self.clear_parent(&child);
        self.children
            .entry(parent.clone())
            .or_default()
            .push(child.clone());
        self.parent.insert(child, parent);
        self
    }

    pub fn clear_parent(&mut self, child: &str) -> &mut Self {
        if let Some(old) = self.parent.remove(child) {
            if let Some(siblings) = self.children.get_mut(&old) {
                siblings.retain(|c| c != child);
            }
        }
        self
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parent.get(child).map(String::as_str)
    }

    pub fn children(&self, parent: &str) -> &[String] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_compound(&self, id: &str) -> bool {
        !self.children(id).is_empty()
    }

    /// Nodes without a parent, in insertion order.
    pub fn children_root(&self) -> Vec<&str> {
        self.nodes()
            .filter(|id| !self.parent.contains_key(*id))
            .collect()
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.v == v)
            .map(|e| e.w.as_str())
            .collect()
    }

    pub fn predecessors(&self, w: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.w == w)
            .map(|e| e.v.as_str())
            .collect()
    }
}
