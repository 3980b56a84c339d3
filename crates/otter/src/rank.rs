//! Rank assignment (longest path) and long-edge normalization.

use crate::layer::{LayerGraph, LayerNode};

/// Longest-path ranking: sinks land on the last rank, every edge spans at least `minlen`.
/// Ranks are normalized so the smallest is `0`. Expects an acyclic graph.
pub fn longest_path(g: &mut LayerGraph) {
    fn dfs(g: &LayerGraph, v: usize, memo: &mut [Option<i32>], depth: usize) -> i32 {
        if let Some(rank) = memo[v] {
            return rank;
        }
        let mut rank: Option<i32> = None;
        if depth <= g.nodes.len() {
            for e in g.out_edges(v) {
                let candidate = dfs(g, e.w, memo, depth + 1) - e.minlen as i32;
                rank = Some(rank.map_or(candidate, |r| r.min(candidate)));
            }
        }
        let rank = rank.unwrap_or(0);
        memo[v] = Some(rank);
        rank
    }

    let mut memo: Vec<Option<i32>> = vec![None; g.nodes.len()];
    for v in 0..g.nodes.len() {
        dfs(g, v, &mut memo, 0);
    }
    let min = memo.iter().flatten().copied().min().unwrap_or(0);
    for (node, rank) in g.nodes.iter_mut().zip(memo) {
        node.rank = rank.unwrap_or(0) - min;
    }
}

/// Moves nodes without any edges to rank 0; longest-path would otherwise sink them to the
/// bottom rank alongside the real sinks.
pub fn lift_isolated(g: &mut LayerGraph) {
    for v in 0..g.nodes.len() {
        if g.in_edges(v).next().is_none() && g.out_edges(v).next().is_none() {
            g.nodes[v].rank = 0;
        }
    }
}

/// Splits edges spanning more than one rank into chains through zero-sized dummy nodes.
pub fn normalize(g: &mut LayerGraph) {
    let edges = std::mem::take(&mut g.edges);
    for e in edges {
        let v_rank = g.nodes[e.v].rank;
        let w_rank = g.nodes[e.w].rank;
        if w_rank <= v_rank + 1 {
            g.edges.push(e);
            continue;
        }
        let mut prev = e.v;
        for rank in (v_rank + 1)..w_rank {
            let dummy = g.add_node(LayerNode {
                rank,
                ..LayerNode::dummy()
            });
            g.add_edge(prev, dummy, 1, e.weight);
            prev = dummy;
        }
        g.add_edge(prev, e.w, 1, e.weight);
    }
}
