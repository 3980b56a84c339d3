//! Replayable change records.
//!
//! A [`Patch`] carries enough data to be applied to another copy of the same architecture.
//! Mutation batches are built as patch lists first and then replayed with [`Patch::apply`], so a
//! host that applies a batch in order always reaches the same model the engine returned.

use crate::model::{Architecture, Control, Interface, Node, Relationship};
use serde::{Deserialize, Serialize};

/// Scalar fields addressable by `updateField`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Description,
    DataClassification,
    Protocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeField {
    Name,
    Description,
    DataClassification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipField {
    Description,
    Protocol,
}

impl From<NodeField> for Field {
    fn from(value: NodeField) -> Self {
        match value {
            NodeField::Name => Field::Name,
            NodeField::Description => Field::Description,
            NodeField::DataClassification => Field::DataClassification,
        }
    }
}

impl From<RelationshipField> for Field {
    fn from(value: RelationshipField) -> Self {
        match value {
            RelationshipField::Description => Field::Description,
            RelationshipField::Protocol => Field::Protocol,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Patch {
    UpdateField {
        target: String,
        field: Field,
        value: Option<String>,
    },
    SetControl {
        target: String,
        value: Control,
    },
    RemoveControl {
        target: String,
    },
    SetCapabilities {
        target: String,
        value: Vec<String>,
    },
    SetInterfaces {
        target: String,
        value: Vec<Interface>,
    },
    AddNode {
        target: String,
        value: Node,
    },
    RemoveNode {
        target: String,
    },
    AddRelationship {
        target: String,
        value: Relationship,
    },
    RemoveRelationship {
        target: String,
    },
    SetMembers {
        target: String,
        value: Vec<String>,
    },
    RemoveFlowTransition {
        target: String,
        relationship: String,
    },
}

/// Reference name used when a capability edit needs a mapping and none exists yet.
pub const DEFAULT_DECORATOR_REF: &str = "capabilities";

impl Patch {
    pub fn op(&self) -> &'static str {
        match self {
            Patch::UpdateField { .. } => "updateField",
            Patch::SetControl { .. } => "setControl",
            Patch::RemoveControl { .. } => "removeControl",
            Patch::SetCapabilities { .. } => "setCapabilities",
            Patch::SetInterfaces { .. } => "setInterfaces",
            Patch::AddNode { .. } => "addNode",
            Patch::RemoveNode { .. } => "removeNode",
            Patch::AddRelationship { .. } => "addRelationship",
            Patch::RemoveRelationship { .. } => "removeRelationship",
            Patch::SetMembers { .. } => "setMembers",
            Patch::RemoveFlowTransition { .. } => "removeFlowTransition",
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Patch::UpdateField { target, .. }
            | Patch::SetControl { target, .. }
            | Patch::RemoveControl { target }
            | Patch::SetCapabilities { target, .. }
            | Patch::SetInterfaces { target, .. }
            | Patch::AddNode { target, .. }
            | Patch::RemoveNode { target }
            | Patch::AddRelationship { target, .. }
            | Patch::RemoveRelationship { target }
            | Patch::SetMembers { target, .. }
            | Patch::RemoveFlowTransition { target, .. } => target,
        }
    }

    /// Applies this patch in place. Returns `false` when the target no longer exists (the
    /// patch is then a no-op).
    pub fn apply(&self, arch: &mut Architecture) -> bool {
        match self {
            Patch::UpdateField {
                target,
                field,
                value,
            } => apply_field(arch, target, *field, value.clone()),
            Patch::SetControl { target, value } => {
                arch.controls.insert(target.clone(), value.clone());
                true
            }
            Patch::RemoveControl { target } => arch.controls.shift_remove(target).is_some(),
            Patch::SetCapabilities { target, value } => {
                if !arch.has_node(target) {
                    return false;
                }
                if arch.decorators.is_empty() {
                    if value.is_empty() {
                        return true;
                    }
                    arch.decorators.push(crate::model::Decorator {
                        reference: DEFAULT_DECORATOR_REF.to_string(),
                        ..Default::default()
                    });
                }
                let Some(active) = arch.decorators.first_mut() else {
                    return false;
                };
                if value.is_empty() {
                    active.mappings.shift_remove(target);
                } else {
                    let entry = active.mappings.entry(target.clone()).or_default();
                    entry.capabilities = value.iter().cloned().collect();
                }
                true
            }
            Patch::SetInterfaces { target, value } => match arch.node_mut(target) {
                Some(node) => {
                    node.interfaces = value.clone();
                    true
                }
                None => false,
            },
            Patch::AddNode { target, value } => {
                if arch.has_node(target) {
                    return false;
                }
                arch.nodes.push(value.clone());
                true
            }
            Patch::RemoveNode { target } => {
                let before = arch.nodes.len();
                arch.nodes.retain(|n| n.unique_id != *target);
                if arch.nodes.len() == before {
                    return false;
                }
                for decorator in &mut arch.decorators {
                    decorator.mappings.shift_remove(target);
                }
                true
            }
            Patch::AddRelationship { target, value } => {
                if arch.has_relationship(target) {
                    return false;
                }
                arch.relationships.push(value.clone());
                true
            }
            Patch::RemoveRelationship { target } => {
                let before = arch.relationships.len();
                arch.relationships.retain(|r| r.unique_id != *target);
                arch.relationships.len() != before
            }
            Patch::SetMembers { target, value } => {
                let Some(rel) = arch.relationship_mut(target) else {
                    return false;
                };
                match rel.relationship_type.members_mut() {
                    Some(nodes) => {
                        *nodes = value.clone();
                        true
                    }
                    None => false,
                }
            }
            Patch::RemoveFlowTransition {
                target,
                relationship,
            } => {
                let Some(flow) = arch.flow_mut(target) else {
                    return false;
                };
                let before = flow.transitions.len();
                flow.transitions
                    .retain(|t| t.relationship_unique_id != *relationship);
                flow.transitions.len() != before
            }
        }
    }
}

fn apply_field(arch: &mut Architecture, target: &str, field: Field, value: Option<String>) -> bool {
    if let Some(node) = arch.node_mut(target) {
        match field {
            Field::Name => node.name = value.unwrap_or_default(),
            Field::Description => node.description = value,
            Field::DataClassification => node.data_classification = value,
            Field::Protocol => return false,
        }
        return true;
    }
    if let Some(rel) = arch.relationship_mut(target) {
        match field {
            Field::Description => rel.description = value,
            Field::Protocol => rel.protocol = value,
            Field::Name | Field::DataClassification => return false,
        }
        return true;
    }
    false
}

/// Replays a batch in order, returning how many patches found their target.
pub fn apply_all(arch: &mut Architecture, patches: &[Patch]) -> usize {
    patches.iter().filter(|p| p.apply(arch)).count()
}
