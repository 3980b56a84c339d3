//! Index-based nesting view over visual nodes, shared by the layout engines.

use crate::visual::VisualNode;
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) struct Hierarchy<'a> {
    pub nodes: &'a [VisualNode],
    /// Parent index with loops cut; a visible node never points at a hidden parent.
    pub parent: Vec<Option<usize>>,
}

impl<'a> Hierarchy<'a> {
    pub fn new(nodes: &'a [VisualNode]) -> Self {
        let index: FxHashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        let mut parent: Vec<Option<usize>> = nodes
            .iter()
            .map(|n| {
                let p = *index.get(n.parent_id.as_deref()?)?;
                (n.hidden || !nodes[p].hidden).then_some(p)
            })
            .collect();

        for i in 0..nodes.len() {
            let mut seen: FxHashSet<usize> = FxHashSet::default();
            seen.insert(i);
            let mut cur = parent[i];
            while let Some(p) = cur {
                if !seen.insert(p) {
                    parent[i] = None;
                    break;
                }
                cur = parent[p];
            }
        }
        Self { nodes, parent }
    }

    /// Nearest visible self-or-ancestor.
    pub fn representative(&self, mut i: usize) -> usize {
        let start = i;
        while self.nodes[i].hidden {
            match self.parent[i] {
                Some(p) => i = p,
                None => return start,
            }
        }
        i
    }

    /// Visible members per level (`None` = top level), in input order.
    pub fn visible_levels(&self) -> FxHashMap<Option<usize>, Vec<usize>> {
        let mut levels: FxHashMap<Option<usize>, Vec<usize>> = FxHashMap::default();
        for (i, n) in self.nodes.iter().enumerate() {
            if !n.hidden {
                levels.entry(self.parent[i]).or_default().push(i);
            }
        }
        levels
    }
}
