//! Serializable edit intents.
//!
//! Hosts (and the CLI) submit edits as data; [`EditIntent::apply`] dispatches each one to the
//! matching [`crate::mutation`] operation.

use crate::factory::{DiagramType, create_default_node, create_default_relationship};
use crate::model::{Architecture, Control, Interface, Node, NodeKind, Relationship};
use crate::mutation::{self, Mutation};
use crate::patch::{NodeField, RelationshipField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EditIntent {
    AddNode {
        node: Node,
    },
    RemoveNode {
        id: String,
    },
    AddRelationship {
        relationship: Relationship,
    },
    RemoveRelationship {
        id: String,
    },
    #[serde(rename_all = "camelCase")]
    AddNodeToContainer {
        child: String,
        container: String,
    },
    RemoveNodeFromAnyContainer {
        id: String,
    },
    UpdateNodeField {
        id: String,
        field: NodeField,
        value: Option<String>,
    },
    UpdateRelationshipField {
        id: String,
        field: RelationshipField,
        value: Option<String>,
    },
    SetControl {
        key: String,
        control: Control,
    },
    RemoveControl {
        key: String,
    },
    SetCapabilities {
        id: String,
        capabilities: Vec<String>,
    },
    SetInterfaces {
        id: String,
        interfaces: Vec<Interface>,
    },
    #[serde(rename_all = "camelCase")]
    CreateNode {
        kind: NodeKind,
        #[serde(default)]
        diagram_type: DiagramType,
    },
    #[serde(rename_all = "camelCase")]
    Connect {
        source: String,
        target: String,
        #[serde(default)]
        diagram_type: DiagramType,
    },
}

impl EditIntent {
    pub fn apply(&self, arch: &Architecture) -> Mutation {
        match self {
            EditIntent::AddNode { node } => mutation::add_node(arch, node.clone()),
            EditIntent::RemoveNode { id } => mutation::remove_node(arch, id),
            EditIntent::AddRelationship { relationship } => {
                mutation::add_relationship(arch, relationship.clone())
            }
            EditIntent::RemoveRelationship { id } => mutation::remove_relationship(arch, id),
            EditIntent::AddNodeToContainer { child, container } => {
                mutation::add_node_to_container(arch, child, container)
            }
            EditIntent::RemoveNodeFromAnyContainer { id } => {
                mutation::remove_node_from_any_container(arch, id)
            }
            EditIntent::UpdateNodeField { id, field, value } => {
                mutation::update_node_field(arch, id, *field, value.clone())
            }
            EditIntent::UpdateRelationshipField { id, field, value } => {
                mutation::update_relationship_field(arch, id, *field, value.clone())
            }
            EditIntent::SetControl { key, control } => {
                mutation::set_control(arch, key, control.clone())
            }
            EditIntent::RemoveControl { key } => mutation::remove_control(arch, key),
            EditIntent::SetCapabilities { id, capabilities } => {
                mutation::set_capabilities(arch, id, capabilities)
            }
            EditIntent::SetInterfaces { id, interfaces } => {
                mutation::set_interfaces(arch, id, interfaces.clone())
            }
            EditIntent::CreateNode { kind, diagram_type } => {
                mutation::add_node(arch, create_default_node(*diagram_type, *kind))
            }
            EditIntent::Connect {
                source,
                target,
                diagram_type,
            } => match create_default_relationship(*diagram_type, source, target, arch) {
                Some(rel) => mutation::add_relationship(arch, rel),
                None => Mutation::unchanged(arch),
            },
        }
    }
}

/// Applies intents in order, concatenating their patch batches.
pub fn apply_script(arch: &Architecture, intents: &[EditIntent]) -> Mutation {
    intents
        .iter()
        .fold(Mutation::unchanged(arch), |acc, intent| {
            acc.then(|next| intent.apply(next))
        })
}
