//! Minimal valid nodes and relationships for interactive creation.

use crate::model::{Architecture, Node, NodeKind, Relationship, RelationshipKind};
use crate::mutation::unique_relationship_id;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    #[default]
    Architecture,
    Flow,
}

impl DiagramType {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagramType::Architecture => "architecture",
            DiagramType::Flow => "flow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "architecture" => Some(Self::Architecture),
            "flow" => Some(Self::Flow),
            _ => None,
        }
    }
}

fn placeholder_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::System => "New System",
        NodeKind::Actor => "New Actor",
        NodeKind::Service => "New Service",
        NodeKind::Database => "New Database",
        NodeKind::Network => "New Network",
    }
}

/// A fresh node with a random id and a placeholder name.
///
/// Node defaults do not depend on the diagram type today; the parameter keeps creation flows
/// symmetric with [`create_default_relationship`].
pub fn create_default_node(_diagram_type: DiagramType, kind: NodeKind) -> Node {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    Node {
        unique_id: format!("{kind}-{}", &suffix[..12]),
        node_type: kind,
        name: placeholder_name(kind).to_string(),
        description: None,
        interfaces: Vec::new(),
        data_classification: None,
        details: None,
    }
}

/// A relationship between two existing, distinct nodes.
///
/// In architecture diagrams an actor source yields an `interacts` relationship; everything else
/// (and every flow-diagram edge) becomes `connects`. Returns `None` for unknown ids or a
/// self-connection.
pub fn create_default_relationship(
    diagram_type: DiagramType,
    source_id: &str,
    target_id: &str,
    arch: &Architecture,
) -> Option<Relationship> {
    if source_id == target_id {
        return None;
    }
    let source = arch.node(source_id)?;
    arch.node(target_id)?;

    let interacts = diagram_type == DiagramType::Architecture && source.node_type == NodeKind::Actor;
    let (verb, kind) = if interacts {
        (
            "interacts",
            RelationshipKind::Interacts {
                actor: source_id.to_string(),
                nodes: vec![target_id.to_string()],
            },
        )
    } else {
        (
            "connects",
            RelationshipKind::Connects {
                source: source_id.to_string(),
                target: target_id.to_string(),
                interfaces: Vec::new(),
            },
        )
    };

    Some(Relationship {
        unique_id: unique_relationship_id(arch, &format!("{source_id}-{verb}-{target_id}")),
        description: None,
        relationship_type: kind,
        protocol: None,
    })
}
