mod capability;
mod edit;

use crate::*;
use serde_json::json;

pub(crate) fn node(id: &str, kind: NodeKind) -> Node {
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

/// Container `a` holding `b`, orphan `c`, actor `u` talking to `b`, `b -> c` traversed by a flow.
pub(crate) fn sample() -> Architecture {
    serde_json::from_value(json!({
        "nodes": [
            { "unique-id": "a", "node-type": "system", "name": "A" },
            { "unique-id": "b", "node-type": "service", "name": "B" },
            { "unique-id": "c", "node-type": "service", "name": "C" },
            { "unique-id": "u", "node-type": "actor", "name": "U" }
        ],
        "relationships": [
            { "unique-id": "a-b", "relationship-type": { "composed-of": { "container": "a", "nodes": ["b"] } } },
            { "unique-id": "u-b", "relationship-type": { "interacts": { "actor": "u", "nodes": ["b"] } } },
            { "unique-id": "b-c", "relationship-type": { "connects": { "source": "b", "target": "c" } }, "protocol": "HTTPS" }
        ],
        "flows": [
            {
                "unique-id": "checkout",
                "name": "Checkout",
                "transitions": [
                    { "relationship-unique-id": "u-b", "sequence-number": 1, "summary": "user calls b" },
                    { "relationship-unique-id": "b-c", "sequence-number": 2, "summary": "b calls c" }
                ]
            }
        ],
        "decorators": [
            { "ref": "capability-map", "mappings": { "b": { "capabilities": ["payments"] } } }
        ],
        "controls": {
            "security": { "description": "TLS everywhere", "requirements": [] }
        }
    }))
    .unwrap()
}
