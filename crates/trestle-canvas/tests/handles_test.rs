use proptest::prelude::*;
use trestle_canvas::geom::rect;
use trestle_canvas::{
    CanvasConfig, NodeRect, Side, VisualEdge, VisualEdgeKind, assign_edge_handles,
};

fn node(id: &str, x: f64, y: f64) -> NodeRect {
    NodeRect {
        id: id.to_string(),
        rect: rect(x, y, 100.0, 100.0),
        is_container: false,
        hidden: false,
    }
}

fn edge(id: &str, source: &str, target: &str) -> VisualEdge {
    VisualEdge {
        id: id.to_string(),
        relationship_id: id.to_string(),
        kind: VisualEdgeKind::Connects,
        source: source.to_string(),
        target: target.to_string(),
        label: None,
        source_handle: None,
        target_handle: None,
    }
}

/// `hub` at the origin with `n` targets far to the right, each slightly lower than the last.
fn star(n: usize) -> (Vec<NodeRect>, Vec<VisualEdge>) {
    let mut nodes = vec![node("hub", 0.0, 0.0)];
    let mut edges = Vec::new();
    for i in 0..n {
        let id = format!("t{i}");
        nodes.push(node(&id, 1000.0, 10.0 * i as f64));
        edges.push(edge(&format!("e{i}"), "hub", &id));
    }
    (nodes, edges)
}

#[test]
fn sectors_follow_the_angle() {
    assert_eq!(Side::facing(1.0, 0.0), Side::Right);
    assert_eq!(Side::facing(0.0, 1.0), Side::Bottom);
    assert_eq!(Side::facing(0.0, -1.0), Side::Top);
    assert_eq!(Side::facing(-1.0, 0.0), Side::Left);
    assert_eq!(Side::facing(1.0, 1.0), Side::Right);
    assert_eq!(Side::facing(1.0, -1.0), Side::Right);
    assert_eq!(Side::facing(-1.0, 1.0), Side::Bottom);
    assert_eq!(Side::facing(-1.0, -1.0), Side::Top);
    assert_eq!(Side::facing(0.0, 0.0), Side::Right);
}

#[test]
fn handle_ids_name_side_and_role() {
    assert_eq!(Side::Top.source_handle(), "top-src");
    assert_eq!(Side::Left.target_handle(), "left-tgt");
    assert_eq!(Side::Right.opposite(), Side::Left);
    assert_eq!(Side::Top.perpendicular(-3.0, 0.0), Side::Left);
    assert_eq!(Side::Right.perpendicular(0.0, -3.0), Side::Top);
}

#[test]
fn fourth_edge_spills_to_the_perpendicular_side() {
    let (nodes, edges) = star(4);
    let out = assign_edge_handles(&nodes, &edges, &CanvasConfig::default());

    let sources: Vec<&str> = out
        .iter()
        .map(|e| e.source_handle.as_deref().unwrap())
        .collect();
    assert_eq!(sources, vec!["right-src", "right-src", "right-src", "bottom-src"]);
    assert!(out.iter().all(|e| e.target_handle.as_deref() == Some("left-tgt")));
}

#[test]
fn opposite_endpoints_face_each_other() {
    let nodes = vec![node("top", 0.0, 0.0), node("bottom", 0.0, 400.0)];
    let out = assign_edge_handles(
        &nodes,
        &[edge("down", "top", "bottom"), edge("up", "bottom", "top")],
        &CanvasConfig::default(),
    );
    assert_eq!(out[0].source_handle.as_deref(), Some("bottom-src"));
    assert_eq!(out[0].target_handle.as_deref(), Some("top-tgt"));
    assert_eq!(out[1].source_handle.as_deref(), Some("top-src"));
    assert_eq!(out[1].target_handle.as_deref(), Some("bottom-tgt"));
}

#[test]
fn edges_with_unknown_endpoints_are_untouched() {
    let nodes = vec![node("a", 0.0, 0.0)];
    let input = vec![edge("dangling", "a", "ghost")];
    let out = assign_edge_handles(&nodes, &input, &CanvasConfig::default());
    assert_eq!(out, input);
}

#[test]
fn assignment_is_deterministic() {
    let (nodes, edges) = star(9);
    let config = CanvasConfig::default();
    assert_eq!(
        assign_edge_handles(&nodes, &edges, &config),
        assign_edge_handles(&nodes, &edges, &config)
    );
}

proptest! {
    #[test]
    fn primary_side_never_exceeds_the_cap_while_the_alternative_has_room(
        max in 1usize..5,
        extra in 0usize..5,
    ) {
        let n = (max + extra).min(2 * max);
        let (nodes, edges) = star(n);
        let mut config = CanvasConfig::default();
        config.max_edges_per_side = max;
        let out = assign_edge_handles(&nodes, &edges, &config);

        let right = out.iter().filter(|e| e.source_handle.as_deref() == Some("right-src")).count();
        let bottom = out.iter().filter(|e| e.source_handle.as_deref() == Some("bottom-src")).count();
        prop_assert_eq!(right, n.min(max));
        prop_assert_eq!(bottom, n - n.min(max));
    }
}
