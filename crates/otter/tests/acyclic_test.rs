use otter::acyclic;
use otter::layer::{LayerGraph, LayerNode};

fn graph(n: usize, edges: &[(usize, usize)]) -> LayerGraph {
    let mut g = LayerGraph::default();
    for _ in 0..n {
        g.add_node(LayerNode::real(1.0, 1.0));
    }
    for &(v, w) in edges {
        g.add_edge(v, w, 1, 1.0);
    }
    g
}

fn has_cycle(g: &LayerGraph) -> bool {
    !acyclic::dfs_fas(g).is_empty()
}

#[test]
fn dfs_fas_is_empty_for_a_dag() {
    let g = graph(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]);
    assert!(acyclic::dfs_fas(&g).is_empty());
}

#[test]
fn dfs_fas_finds_the_closing_edge() {
    let g = graph(3, &[(0, 1), (1, 2), (2, 0)]);
    assert_eq!(acyclic::dfs_fas(&g), vec![2]);
}

#[test]
fn run_breaks_every_cycle() {
    let mut g = graph(4, &[(0, 1), (1, 0), (1, 2), (2, 3), (3, 1)]);
    let reversed = acyclic::run(&mut g);
    assert_eq!(reversed, 2);
    assert!(!has_cycle(&g));
    assert_eq!(g.edges.len(), 5);
}

#[test]
fn run_drops_self_loops() {
    let mut g = graph(2, &[(0, 0), (0, 1)]);
    assert_eq!(acyclic::run(&mut g), 0);
    assert_eq!(g.edges.len(), 1);
}

#[test]
fn out_edge_index_groups_edges_by_source() {
    let g = graph(3, &[(0, 1), (2, 0), (0, 2), (1, 2)]);
    assert_eq!(g.out_edge_index(), vec![vec![0, 2], vec![3], vec![1]]);
}

#[test]
fn long_chains_with_back_edges_become_acyclic() {
    let n = 2_000;
    let mut edges: Vec<(usize, usize)> = (0..n - 1).map(|v| (v, v + 1)).collect();
    edges.extend((10..n).step_by(10).map(|v| (v, v - 10)));
    let mut g = graph(n, &edges);
    let reversed = acyclic::run(&mut g);
    assert_eq!(reversed, 199);
    assert!(!has_cycle(&g));
}
