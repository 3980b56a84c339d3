//! Per-container collapse state.
//!
//! Purely visual: it lives in the visual nodes and the [`Layout`] record, never in the model.

use crate::layout_record::Layout;
use crate::visual::VisualNode;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseMode {
    Expanded,
    Collapsed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CollapseState {
    collapsed: BTreeSet<String>,
}

impl CollapseState {
    pub fn from_layout(layout: &Layout) -> Self {
        Self {
            collapsed: layout
                .nodes
                .iter()
                .filter(|(_, geometry)| geometry.collapsed == Some(true))
                .map(|(id, _)| id.clone())
                .collect(),
        }
    }

    pub fn mode(&self, id: &str) -> CollapseMode {
        if self.collapsed.contains(id) {
            CollapseMode::Collapsed
        } else {
            CollapseMode::Expanded
        }
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    pub fn set(&mut self, id: &str, mode: CollapseMode) {
        match mode {
            CollapseMode::Collapsed => {
                self.collapsed.insert(id.to_string());
            }
            CollapseMode::Expanded => {
                self.collapsed.remove(id);
            }
        }
    }

    /// Flips `id` and returns the new mode.
    pub fn toggle(&mut self, id: &str) -> CollapseMode {
        let next = match self.mode(id) {
            CollapseMode::Expanded => CollapseMode::Collapsed,
            CollapseMode::Collapsed => CollapseMode::Expanded,
        };
        self.set(id, next);
        next
    }

    pub fn write_to(&self, layout: &mut Layout) {
        let ids: Vec<String> = layout.nodes.keys().cloned().collect();
        for id in ids {
            layout.set_collapsed(&id, self.is_collapsed(&id));
        }
        for id in &self.collapsed {
            layout.set_collapsed(id, true);
        }
    }

    /// Marks collapsed containers (shrunk to `header_height`) and hides everything below them.
    pub fn apply(&self, nodes: &mut [VisualNode], header_height: f64) {
        let parents: FxHashMap<String, Option<String>> = nodes
            .iter()
            .map(|n| (n.id.clone(), n.parent_id.clone()))
            .collect();
        let collapsed: FxHashSet<&str> = nodes
            .iter()
            .filter(|n| n.is_container && self.collapsed.contains(&n.id))
            .map(|n| n.id.as_str())
            .collect();

        let hidden: Vec<bool> = nodes
            .iter()
            .map(|n| {
                let mut seen: FxHashSet<&str> = FxHashSet::default();
                let mut cur = n.parent_id.as_deref();
                while let Some(parent) = cur {
                    if collapsed.contains(parent) {
                        return true;
                    }
                    if !seen.insert(parent) {
                        break;
                    }
                    cur = parents.get(parent).and_then(|p| p.as_deref());
                }
                false
            })
            .collect();
        let collapsed: FxHashSet<String> = collapsed.into_iter().map(str::to_string).collect();

        for (node, hidden) in nodes.iter_mut().zip(hidden) {
            node.hidden = hidden;
            node.collapsed = collapsed.contains(&node.id);
            if node.collapsed {
                node.height = header_height;
            }
        }
    }
}
