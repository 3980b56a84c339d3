//! Index-based flat graph used by the per-level pipeline.
//!
//! Compound nesting is resolved before this point: each nesting level is laid out as one flat
//! graph whose nodes are that level's members (compound members already sized to fit their
//! contents) and whose edges are the original edges lifted to that level.

#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    pub width: f64,
    pub height: f64,
    /// Long-edge filler; zero-sized and spaced with `edgesep`.
    pub dummy: bool,
    pub rank: i32,
    pub order: usize,
    pub x: f64,
    pub y: f64,
}

impl LayerNode {
    pub fn real(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            dummy: false,
            rank: 0,
            order: 0,
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn dummy() -> Self {
        Self {
            dummy: true,
            ..Self::real(0.0, 0.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerEdge {
    pub v: usize,
    pub w: usize,
    pub minlen: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerGraph {
    pub nodes: Vec<LayerNode>,
    pub edges: Vec<LayerEdge>,
}

impl LayerGraph {
    pub fn add_node(&mut self, node: LayerNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, v: usize, w: usize, minlen: usize, weight: f64) {
        self.edges.push(LayerEdge {
            v,
            w,
            minlen,
            weight,
        });
    }

    pub fn out_edges(&self, v: usize) -> impl Iterator<Item = &LayerEdge> {
        self.edges.iter().filter(move |e| e.v == v)
    }

    /// Edge indices grouped by source node, in edge order.
    pub fn out_edge_index(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.nodes.len()];
        for (idx, e) in self.edges.iter().enumerate() {
            if let Some(list) = out.get_mut(e.v) {
                list.push(idx);
            }
        }
        out
    }

    pub fn in_edges(&self, w: usize) -> impl Iterator<Item = &LayerEdge> {
        self.edges.iter().filter(move |e| e.w == w)
    }

    /// Nodes grouped by rank, each layer sorted by `order`.
    pub fn layering(&self) -> Vec<Vec<usize>> {
        let max_rank = self.nodes.iter().map(|n| n.rank).max().unwrap_or(0).max(0) as usize;
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
        for (i, n) in self.nodes.iter().enumerate() {
            if let Some(layer) = layers.get_mut(n.rank.max(0) as usize) {
                layer.push(i);
            }
        }
        for layer in &mut layers {
            layer.sort_by_key(|&i| (self.nodes[i].order, i));
        }
        layers
    }
}
