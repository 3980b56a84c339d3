use std::path::PathBuf;
use trestle_canvas::geom::{point, vector};
use trestle_canvas::{
    CanvasConfig, CollapseState, DragMachine, DragState, DropPayload, VisualNode, project,
};
use trestle_core::mutation;
use trestle_core::{
    Architecture, DiagramType, Node, NodeKind, Patch, RelationshipKind,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn basic() -> Architecture {
    let path = workspace_root()
        .join("fixtures")
        .join("architecture")
        .join("basic.json");
    let text = std::fs::read_to_string(&path).expect("fixture");
    Architecture::from_json(&text).expect("valid architecture")
}

/// `a` at (100, 50) holding `b` at (20, 60); `c` and `u` to the right.
fn scene(arch: &Architecture) -> Vec<VisualNode> {
    let mut nodes = project(arch, &CanvasConfig::default(), &CollapseState::default()).nodes;
    for n in &mut nodes {
        let (x, y) = match n.id.as_str() {
            "a" => (100.0, 50.0),
            "b" | "n" => (20.0, 60.0),
            "c" => (500.0, 50.0),
            "u" => (500.0, 400.0),
            _ => (0.0, 0.0),
        };
        n.x = x;
        n.y = y;
    }
    nodes
}

fn node(id: &str, kind: NodeKind) -> Node {
    Node {
        unique_id: id.to_string(),
        node_type: kind,
        name: id.to_uppercase(),
        description: None,
        interfaces: Vec::new(),
        data_classification: None,
        details: None,
    }
}

#[test]
fn dropping_an_orphan_into_a_container_adds_one_membership() {
    let arch = basic();
    let mut nodes = scene(&arch);
    let mut drag = DragMachine::new();

    assert!(drag.start(&mut nodes, "c", false));
    assert_eq!(
        drag.state(),
        &DragState::Dragging {
            node_id: "c".to_string(),
            detached: false
        }
    );
    drag.move_by(&mut nodes, vector(-300.0, 20.0));
    let c = nodes.iter().find(|n| n.id == "c").unwrap();
    assert_eq!((c.x, c.y), (200.0, 70.0));

    let m = drag.drop_at(&arch, &nodes, point(200.0, 100.0));
    assert_eq!(
        drag.state(),
        &DragState::DroppedInContainer {
            node_id: "c".to_string(),
            container_id: "a".to_string()
        }
    );
    assert_eq!(m.patches.len(), 1);
    match &m.patches[0] {
        Patch::AddRelationship { value, .. } => assert_eq!(
            value.relationship_type,
            RelationshipKind::ComposedOf {
                container: "a".to_string(),
                nodes: vec!["c".to_string()]
            }
        ),
        other => panic!("unexpected patch {other:?}"),
    }
    assert_eq!(m.architecture.container_of("c"), Some("a"));
    assert_eq!(m.architecture.relationship("a-b"), arch.relationship("a-b"));
}

#[test]
fn dropping_on_empty_canvas_detaches() {
    let arch = basic();
    let mut nodes = scene(&arch);
    let mut drag = DragMachine::new();

    assert!(drag.start(&mut nodes, "b", false));
    drag.move_by(&mut nodes, vector(800.0, 800.0));
    let m = drag.drop_at(&arch, &nodes, point(1000.0, 1000.0));

    assert_eq!(
        drag.state(),
        &DragState::DroppedOrphan {
            node_id: "b".to_string()
        }
    );
    assert!(!m.is_noop());
    assert_eq!(m.architecture.container_of("b"), None);
    assert!(m.architecture.has_node("b"));
}

#[test]
fn modifier_drag_detaches_visually_before_the_drop() {
    let arch = basic();
    let mut nodes = scene(&arch);
    let mut drag = DragMachine::new();

    assert!(drag.start(&mut nodes, "b", true));
    assert_eq!(
        drag.state(),
        &DragState::Detaching {
            node_id: "b".to_string()
        }
    );
    let b = nodes.iter().find(|n| n.id == "b").unwrap();
    assert_eq!(b.parent_id, None);
    assert_eq!((b.x, b.y), (120.0, 110.0));

    drag.move_by(&mut nodes, vector(5.0, 5.0));
    assert_eq!(
        drag.state(),
        &DragState::Dragging {
            node_id: "b".to_string(),
            detached: true
        }
    );

    // Back inside its own container: membership is unchanged.
    let m = drag.drop_at(&arch, &nodes, point(150.0, 120.0));
    assert!(m.is_noop());
    assert_eq!(
        drag.state(),
        &DragState::DroppedInContainer {
            node_id: "b".to_string(),
            container_id: "a".to_string()
        }
    );
}

#[test]
fn a_container_cannot_be_dropped_into_its_own_subtree() {
    let arch = mutation::add_node(&basic(), node("n", NodeKind::Network))
        .then(|a| mutation::add_node_to_container(a, "n", "a"))
        .architecture;
    let mut nodes = scene(&arch);
    let mut drag = DragMachine::new();

    assert!(drag.start(&mut nodes, "a", false));
    // Inside `n` (absolute 120..360 x 110..270) but below `a`.
    let m = drag.drop_at(&arch, &nodes, point(300.0, 250.0));
    assert!(m.is_noop());
    assert_eq!(
        drag.state(),
        &DragState::DroppedOrphan {
            node_id: "a".to_string()
        }
    );
}

#[test]
fn start_refuses_unknown_nodes_and_concurrent_drags() {
    let arch = basic();
    let mut nodes = scene(&arch);
    let mut drag = DragMachine::new();

    assert!(!drag.start(&mut nodes, "ghost", false));
    assert_eq!(drag.state(), &DragState::Idle);
    assert!(drag.start(&mut nodes, "c", false));
    assert!(!drag.start(&mut nodes, "u", false));
    assert_eq!(drag.dragged(), Some("c"));

    drag.cancel();
    assert_eq!(drag.state(), &DragState::Idle);
    assert_eq!(drag.dragged(), None);
}

#[test]
fn drop_without_a_drag_is_a_no_op() {
    let arch = basic();
    let nodes = scene(&arch);
    let mut drag = DragMachine::new();
    let m = drag.drop_at(&arch, &nodes, point(200.0, 100.0));
    assert!(m.is_noop());
    assert_eq!(m.architecture, arch);
    assert_eq!(drag.state(), &DragState::Idle);
}

#[test]
fn drop_payload_requires_both_kinds() {
    let payload = DropPayload::parse(r#"{ "visualKind": "card", "nodeKind": "database" }"#).unwrap();
    assert_eq!(payload.visual_kind, "card");
    assert_eq!(payload.node_kind, NodeKind::Database);

    assert_eq!(DropPayload::parse(r#"{ "nodeKind": "database" }"#), None);
    assert_eq!(DropPayload::parse(r#"{ "visualKind": "  ", "nodeKind": "database" }"#), None);
    assert_eq!(DropPayload::parse(r#"{ "visualKind": "card", "nodeKind": "queue" }"#), None);
    assert_eq!(DropPayload::parse(r#"{ "visualKind": "card" }"#), None);
    assert_eq!(DropPayload::parse("not json"), None);
    assert_eq!(DropPayload::from_entries(Some("card"), None), None);
}

#[test]
fn palette_drop_inside_a_container_nests_the_new_node() {
    let arch = basic();
    let nodes = scene(&arch);
    let payload = DropPayload::from_entries(Some("card"), Some("service")).unwrap();

    let (id, m) = payload.create(&arch, DiagramType::Architecture, &nodes, point(300.0, 200.0));
    assert_eq!(m.patches.len(), 2);
    assert_eq!(m.patches[0].op(), "addNode");
    assert_eq!(m.patches[1].op(), "addRelationship");
    assert_eq!(m.architecture.node(&id).unwrap().node_type, NodeKind::Service);
    assert_eq!(m.architecture.container_of(&id), Some("a"));

    let (id, m) = payload.create(&arch, DiagramType::Architecture, &nodes, point(2000.0, 2000.0));
    assert_eq!(m.patches.len(), 1);
    assert_eq!(m.architecture.container_of(&id), None);
}
