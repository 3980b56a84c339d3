use super::sample;
use crate::*;
use serde_json::json;

#[test]
fn edit_script_decodes_and_applies_in_order() {
    let script: Vec<EditIntent> = serde_json::from_value(json!([
        { "op": "addNodeToContainer", "child": "c", "container": "a" },
        { "op": "updateNodeField", "id": "c", "field": "description", "value": "catalog" },
        { "op": "setCapabilities", "id": "c", "capabilities": ["search"] },
        { "op": "removeControl", "key": "security" },
        { "op": "removeNode", "id": "ghost" }
    ]))
    .unwrap();

    let m = apply_script(&sample(), &script);
    assert_eq!(m.architecture.container_of("c"), Some("a"));
    assert_eq!(
        m.architecture.node("c").unwrap().description.as_deref(),
        Some("catalog")
    );
    assert!(m.architecture.controls.is_empty());
    let ops: Vec<&str> = m.patches.iter().map(Patch::op).collect();
    assert_eq!(
        ops,
        vec!["addRelationship", "updateField", "setCapabilities", "removeControl"]
    );
}

#[test]
fn create_and_connect_intents_use_factories() {
    let script = vec![
        EditIntent::CreateNode {
            kind: NodeKind::Database,
            diagram_type: DiagramType::Architecture,
        },
        EditIntent::Connect {
            source: "u".to_string(),
            target: "c".to_string(),
            diagram_type: DiagramType::Architecture,
        },
    ];
    let m = apply_script(&sample(), &script);
    assert_eq!(m.architecture.nodes.len(), 5);
    assert!(m.architecture.has_relationship("u-interacts-c"));
}
