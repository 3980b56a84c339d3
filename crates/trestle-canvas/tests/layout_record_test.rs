use trestle_canvas::geom::{point, rect};
use trestle_canvas::{LAYOUT_VERSION, Layout, PlacedNode, SavedNodeGeometry, Viewport, Waypoint};
use trestle_core::DiagramType;

const SAVED: &str = r#"{
  "version": 1,
  "diagramType": "architecture",
  "viewport": { "x": 10, "y": -5, "zoom": 1.5 },
  "nodes": {
    "a": { "x": 20, "y": 40, "width": 300, "height": 200 },
    "b": { "x": "oops", "y": 10 },
    "c": 42,
    "d": { "x": 0, "y": 0, "width": 100, "height": 50, "collapsed": true }
  },
  "edges": {
    "b-c": { "waypoints": [{ "x": 1, "y": 2 }] },
    "broken": "nope"
  },
  "gridSize": 10,
  "snapToGrid": true,
  "lastModified": "2026-01-02T03:04:05Z",
  "theme": { "accent": "teal" }
}"#;

#[test]
fn complete_entries_pin_nodes() {
    let layout = Layout::from_json(SAVED).unwrap();
    assert_eq!(layout.pinned("a"), Some(rect(20.0, 40.0, 300.0, 200.0)));
    assert_eq!(layout.pinned("d"), Some(rect(0.0, 0.0, 100.0, 50.0)));
    assert_eq!(layout.pinned("missing"), None);
}

#[test]
fn malformed_entries_degrade_individually() {
    let layout = Layout::from_json(SAVED).unwrap();

    let b = &layout.nodes["b"];
    assert_eq!(b.x, None);
    assert_eq!(b.y, Some(10.0));
    assert_eq!(layout.pinned("b"), None);

    assert_eq!(layout.nodes["c"], SavedNodeGeometry::default());
    assert_eq!(layout.pinned("c"), None);

    assert!(layout.edges["broken"].waypoints.is_empty());
    assert_eq!(layout.edges["b-c"].waypoints, vec![Waypoint { x: 1.0, y: 2.0 }]);
    assert_eq!(layout.nodes["d"].collapsed, Some(true));
}

#[test]
fn top_level_fields_and_extensions_survive_a_round_trip() {
    let layout = Layout::from_json(SAVED).unwrap();
    assert_eq!(layout.diagram_type, DiagramType::Architecture);
    assert_eq!(
        layout.viewport,
        Viewport {
            x: 10.0,
            y: -5.0,
            zoom: 1.5
        }
    );
    assert_eq!(layout.grid_size, 10.0);
    assert!(layout.snap_to_grid);
    assert_eq!(
        layout.extensions.get("theme"),
        Some(&serde_json::json!({ "accent": "teal" }))
    );

    let text = layout.to_json_pretty().unwrap();
    let reread = Layout::from_json(&text).unwrap();
    assert_eq!(reread, layout);
    let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(raw["theme"]["accent"], "teal");
    assert_eq!(raw["lastModified"], "2026-01-02T03:04:05Z");
}

#[test]
fn newer_versions_and_unknown_diagram_types_still_read() {
    let layout = Layout::from_json(r#"{ "version": 7, "diagramType": "mindmap" }"#).unwrap();
    assert_eq!(layout.version, 7);
    assert_eq!(layout.diagram_type, DiagramType::default());
    assert!(layout.nodes.is_empty());
    assert_eq!(layout.viewport.zoom, 1.0);
}

#[test]
fn invalid_json_is_an_error() {
    assert!(Layout::from_json("{ not json").is_err());
    assert!(Layout::from_json("42").is_err());
}

#[test]
fn empty_layout_uses_current_version() {
    let layout = Layout::empty(DiagramType::Flow);
    assert_eq!(layout.version, LAYOUT_VERSION);
    assert_eq!(layout.diagram_type, DiagramType::Flow);
    assert!(!layout.snap_to_grid);
}

#[test]
fn moves_snap_to_the_grid_when_enabled() {
    let mut layout = Layout::from_json(SAVED).unwrap();
    layout.move_node("b", 23.0, 27.0);
    assert_eq!((layout.nodes["b"].x, layout.nodes["b"].y), (Some(20.0), Some(30.0)));

    layout.snap_to_grid = false;
    layout.move_node("b", 23.0, 27.0);
    assert_eq!((layout.nodes["b"].x, layout.nodes["b"].y), (Some(23.0), Some(27.0)));

    layout.move_node("b", f64::NAN, 1.0);
    assert_eq!(layout.nodes["b"].x, Some(23.0));
}

#[test]
fn exact_origins_bypass_the_grid() {
    let mut layout = Layout::from_json(SAVED).unwrap();
    assert!(layout.snap_to_grid);
    assert_eq!(layout.snap_point(point(23.0, 27.0)), point(20.0, 30.0));

    layout.set_origin("b", 23.0, 27.0);
    assert_eq!((layout.nodes["b"].x, layout.nodes["b"].y), (Some(23.0), Some(27.0)));
    layout.set_origin("b", 1.0, f64::INFINITY);
    assert_eq!(layout.nodes["b"].x, Some(23.0));
}

#[test]
fn recording_placements_keeps_collapse_flags() {
    let mut layout = Layout::from_json(SAVED).unwrap();
    layout.record_nodes(&[PlacedNode {
        id: "d".to_string(),
        x: 5.0,
        y: 6.0,
        width: 70.0,
        height: 80.0,
    }]);
    assert_eq!(layout.pinned("d"), Some(rect(5.0, 6.0, 70.0, 80.0)));
    assert_eq!(layout.nodes["d"].collapsed, Some(true));

    layout.set_collapsed("d", false);
    assert_eq!(layout.nodes["d"].collapsed, None);
    layout.set_collapsed("nobody", false);
    assert!(!layout.nodes.contains_key("nobody"));
}

#[test]
fn negative_sizes_are_not_recorded() {
    let mut layout = Layout::empty(DiagramType::Architecture);
    layout.resize_node("x", -1.0, 10.0);
    assert!(!layout.nodes.contains_key("x"));
    layout.resize_node("x", 10.0, 10.0);
    layout.move_node("x", 1.0, 2.0);
    assert_eq!(layout.pinned("x"), Some(rect(1.0, 2.0, 10.0, 10.0)));
}
