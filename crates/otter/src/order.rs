//! Crossing reduction: DFS initial order, then barycenter sweeps keeping the best layering.

use crate::layer::LayerGraph;

/// Initial order: nodes sorted by (rank, index) and expanded depth-first along successors, so
/// connected nodes start out close together.
pub fn init_order(g: &LayerGraph) -> Vec<Vec<usize>> {
    let max_rank = g.nodes.iter().map(|n| n.rank).max().unwrap_or(0).max(0) as usize;
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    let mut visited = vec![false; g.nodes.len()];

    fn dfs(g: &LayerGraph, v: usize, visited: &mut [bool], layers: &mut [Vec<usize>]) {
        if visited[v] {
            return;
        }
        visited[v] = true;
        if let Some(layer) = layers.get_mut(g.nodes[v].rank.max(0) as usize) {
            layer.push(v);
        }
        let succ: Vec<usize> = g.out_edges(v).map(|e| e.w).collect();
        for w in succ {
            dfs(g, w, visited, layers);
        }
    }

    let mut start: Vec<usize> = (0..g.nodes.len()).collect();
    start.sort_by_key(|&v| (g.nodes[v].rank, v));
    for v in start {
        dfs(g, v, &mut visited, &mut layers);
    }
    layers
}

/// Weighted crossings between every pair of adjacent layers.
pub fn cross_count(g: &LayerGraph, layering: &[Vec<usize>]) -> f64 {
    layering
        .windows(2)
        .map(|pair| two_layer_cross_count(g, &pair[0], &pair[1]))
        .sum()
}

fn two_layer_cross_count(g: &LayerGraph, north: &[usize], south: &[usize]) -> f64 {
    if south.is_empty() {
        return 0.0;
    }
    let mut south_pos = vec![usize::MAX; g.nodes.len()];
    for (i, &v) in south.iter().enumerate() {
        south_pos[v] = i;
    }

    let mut entries: Vec<(usize, f64)> = Vec::new();
    for &v in north {
        let mut row: Vec<(usize, f64)> = g
            .out_edges(v)
            .filter(|e| south_pos[e.w] != usize::MAX)
            .map(|e| (south_pos[e.w], e.weight))
            .collect();
        row.sort_by_key(|(pos, _)| *pos);
        entries.extend(row);
    }

    // Accumulator tree over south positions.
    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree = vec![0.0f64; tree_size];

    let mut cc = 0.0;
    for (pos, weight) in entries {
        let mut index = pos + first_index;
        tree[index] += weight;
        let mut weight_sum = 0.0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += weight;
        }
        cc += weight * weight_sum;
    }
    cc
}

fn sort_layer_by_barycenter(g: &LayerGraph, layer: &mut [usize], fixed: &[usize], downward: bool) {
    let mut fixed_pos = vec![None; g.nodes.len()];
    for (i, &v) in fixed.iter().enumerate() {
        fixed_pos[v] = Some(i as f64);
    }

    let mut keyed: Vec<(f64, usize, usize)> = layer
        .iter()
        .enumerate()
        .map(|(current, &v)| {
            let mut sum = 0.0;
            let mut weight = 0.0;
            let neighbours: Vec<(usize, f64)> = if downward {
                g.in_edges(v).map(|e| (e.v, e.weight)).collect()
            } else {
                g.out_edges(v).map(|e| (e.w, e.weight)).collect()
            };
            for (u, w) in neighbours {
                if let Some(pos) = fixed_pos[u] {
                    sum += pos * w;
                    weight += w;
                }
            }
            let bary = if weight > 0.0 {
                sum / weight
            } else {
                current as f64
            };
            (bary, current, v)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    for (slot, (_, _, v)) in layer.iter_mut().zip(keyed) {
        *slot = v;
    }
}

/// Runs the sweeps and writes the best `order` found back onto the nodes.
pub fn run(g: &mut LayerGraph, iterations: usize) {
    let mut layering = init_order(g);
    let mut best = layering.clone();
    let mut best_cc = cross_count(g, &layering);

    for _ in 0..iterations {
        if best_cc == 0.0 {
            break;
        }
        for i in 1..layering.len() {
            let (head, tail) = layering.split_at_mut(i);
            sort_layer_by_barycenter(g, &mut tail[0], &head[i - 1], true);
        }
        for i in (0..layering.len().saturating_sub(1)).rev() {
            let (head, tail) = layering.split_at_mut(i + 1);
            sort_layer_by_barycenter(g, &mut head[i], &tail[0], false);
        }
        let cc = cross_count(g, &layering);
        if cc < best_cc {
            best_cc = cc;
            best = layering.clone();
        }
    }

    for layer in &best {
        for (order, &v) in layer.iter().enumerate() {
            g.nodes[v].order = order;
        }
    }
}
