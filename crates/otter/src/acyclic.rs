//! Break cycles by reversing a DFS feedback arc set.

use crate::layer::LayerGraph;

/// Indices of edges that close a cycle when nodes are visited in index order.
pub fn dfs_fas(g: &LayerGraph) -> Vec<usize> {
    fn dfs(
        g: &LayerGraph,
        out: &[Vec<usize>],
        v: usize,
        visited: &mut [bool],
        on_stack: &mut [bool],
        fas: &mut Vec<usize>,
    ) {
        if visited[v] {
            return;
        }
        visited[v] = true;
        on_stack[v] = true;
        for &idx in &out[v] {
            let w = g.edges[idx].w;
            if w == v {
                continue;
            }
            if on_stack[w] {
                fas.push(idx);
            } else {
                dfs(g, out, w, visited, on_stack, fas);
            }
        }
        on_stack[v] = false;
    }

    let n = g.nodes.len();
    let out = g.out_edge_index();
    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    let mut fas: Vec<usize> = Vec::new();
    for v in 0..n {
        dfs(g, &out, v, &mut visited, &mut on_stack, &mut fas);
    }
    fas
}

/// Drops self-loops and reverses the feedback arc set. Returns the number of reversed edges.
pub fn run(g: &mut LayerGraph) -> usize {
    g.edges.retain(|e| e.v != e.w);
    let fas = dfs_fas(g);
    for &idx in &fas {
        let e = &mut g.edges[idx];
        std::mem::swap(&mut e.v, &mut e.w);
    }
    fas.len()
}
