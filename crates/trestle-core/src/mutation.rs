//! Pure edit operations over an [`Architecture`].
//!
//! Every operation leaves its input untouched and returns a [`Mutation`]: the next snapshot plus
//! the ordered patch batch that produces it. Operations addressing ids that no longer exist are
//! no-ops (same snapshot, empty batch); UI selections can race with asynchronous edits and a
//! stale id must never take the editor down.

use crate::model::{Architecture, Control, Interface, Node, Relationship, RelationshipKind};
use crate::patch::{Field, NodeField, Patch, RelationshipField, apply_all};

#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub architecture: Architecture,
    pub patches: Vec<Patch>,
}

impl Mutation {
    pub fn unchanged(arch: &Architecture) -> Self {
        Self {
            architecture: arch.clone(),
            patches: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.patches.is_empty()
    }

    /// Runs `next` on the resulting snapshot and concatenates both batches.
    pub fn then(self, next: impl FnOnce(&Architecture) -> Mutation) -> Mutation {
        let Mutation {
            architecture,
            mut patches,
        } = self;
        let follow = next(&architecture);
        patches.extend(follow.patches);
        Mutation {
            architecture: follow.architecture,
            patches,
        }
    }
}

fn commit(arch: &Architecture, patches: Vec<Patch>) -> Mutation {
    if patches.is_empty() {
        return Mutation::unchanged(arch);
    }
    let mut next = arch.clone();
    apply_all(&mut next, &patches);
    Mutation {
        architecture: next,
        patches,
    }
}

fn ignored(arch: &Architecture, op: &'static str, id: &str) -> Mutation {
    tracing::debug!(op, id, "ignoring edit on stale or invalid id");
    Mutation::unchanged(arch)
}

pub fn add_node(arch: &Architecture, node: Node) -> Mutation {
    if arch.has_node(&node.unique_id) {
        return ignored(arch, "addNode", &node.unique_id);
    }
    commit(
        arch,
        vec![Patch::AddNode {
            target: node.unique_id.clone(),
            value: node,
        }],
    )
}

/// Removes a node together with everything that references it.
///
/// Relationships anchored on the node (source, target, actor, container) are dropped. Where the
/// node is one member of a longer `nodes[]` list the list is trimmed instead; a list left empty
/// drops its relationship. Flow transitions over dropped relationships go too.
pub fn remove_node(arch: &Architecture, id: &str) -> Mutation {
    if !arch.has_node(id) {
        return ignored(arch, "removeNode", id);
    }

    let mut patches: Vec<Patch> = Vec::new();
    for rel in &arch.relationships {
        let kind = &rel.relationship_type;
        let anchored = match kind {
            RelationshipKind::Connects { source, target, .. } => source == id || target == id,
            _ => kind.anchor() == Some(id),
        };
        if anchored {
            patches.extend(relationship_removal(arch, &rel.unique_id));
            continue;
        }
        let Some(members) = kind.members() else {
            continue;
        };
        if !members.iter().any(|m| m == id) {
            continue;
        }
        let remaining: Vec<String> = members.iter().filter(|m| *m != id).cloned().collect();
        if remaining.is_empty() {
            patches.extend(relationship_removal(arch, &rel.unique_id));
        } else {
            patches.push(Patch::SetMembers {
                target: rel.unique_id.clone(),
                value: remaining,
            });
        }
    }
    patches.push(Patch::RemoveNode {
        target: id.to_string(),
    });
    commit(arch, patches)
}

/// Adds a relationship when its id is fresh and every endpoint exists.
///
/// `composed-of` relationships are additionally refused when they would give a child a second
/// container or nest a container inside its own subtree; use [`add_node_to_container`] to move
/// nodes between containers.
pub fn add_relationship(arch: &Architecture, rel: Relationship) -> Mutation {
    if arch.has_relationship(&rel.unique_id) {
        return ignored(arch, "addRelationship", &rel.unique_id);
    }
    if rel
        .relationship_type
        .node_ids()
        .into_iter()
        .any(|n| !arch.has_node(n))
    {
        return ignored(arch, "addRelationship", &rel.unique_id);
    }
    if let RelationshipKind::ComposedOf { container, nodes } = &rel.relationship_type {
        let invalid = nodes.iter().any(|child| {
            child == container
                || arch.container_of(child).is_some()
                || arch.is_descendant(container, child)
        });
        if invalid {
            return ignored(arch, "addRelationship", &rel.unique_id);
        }
    }
    commit(
        arch,
        vec![Patch::AddRelationship {
            target: rel.unique_id.clone(),
            value: rel,
        }],
    )
}

pub fn remove_relationship(arch: &Architecture, id: &str) -> Mutation {
    if !arch.has_relationship(id) {
        return ignored(arch, "removeRelationship", id);
    }
    commit(arch, relationship_removal(arch, id))
}

fn relationship_removal(arch: &Architecture, rel_id: &str) -> Vec<Patch> {
    let mut patches: Vec<Patch> = arch
        .flows
        .iter()
        .filter(|f| {
            f.transitions
                .iter()
                .any(|t| t.relationship_unique_id == rel_id)
        })
        .map(|f| Patch::RemoveFlowTransition {
            target: f.unique_id.clone(),
            relationship: rel_id.to_string(),
        })
        .collect();
    patches.push(Patch::RemoveRelationship {
        target: rel_id.to_string(),
    });
    patches
}

/// Strips `child` from every `composed-of` relationship listing it.
fn detach_patches(arch: &Architecture, child: &str) -> Vec<Patch> {
    let mut patches = Vec::new();
    for rel in arch.composed_of_memberships(child) {
        let remaining: Vec<String> = rel
            .relationship_type
            .members()
            .unwrap_or_default()
            .iter()
            .filter(|m| *m != child)
            .cloned()
            .collect();
        if remaining.is_empty() {
            patches.extend(relationship_removal(arch, &rel.unique_id));
        } else {
            patches.push(Patch::SetMembers {
                target: rel.unique_id.clone(),
                value: remaining,
            });
        }
    }
    patches
}

/// Moves `child_id` into `container_id`, replacing any current container.
///
/// Idempotent: if the child already sits in `container_id` nothing changes. Refused (no-op)
/// when either id is unknown or the container lives inside the child's own subtree.
pub fn add_node_to_container(arch: &Architecture, child_id: &str, container_id: &str) -> Mutation {
    if child_id == container_id || !arch.has_node(child_id) || !arch.has_node(container_id) {
        return ignored(arch, "addNodeToContainer", child_id);
    }
    if arch.container_of(child_id) == Some(container_id)
        && arch.composed_of_memberships(child_id).count() == 1
    {
        return Mutation::unchanged(arch);
    }
    if arch.is_descendant(container_id, child_id) {
        return ignored(arch, "addNodeToContainer", child_id);
    }

    let mut patches = detach_patches(arch, child_id);
    let rel_id = unique_relationship_id(arch, &format!("{container_id}-composed-of-{child_id}"));
    patches.push(Patch::AddRelationship {
        target: rel_id.clone(),
        value: Relationship {
            unique_id: rel_id,
            description: None,
            relationship_type: RelationshipKind::ComposedOf {
                container: container_id.to_string(),
                nodes: vec![child_id.to_string()],
            },
            protocol: None,
        },
    });
    commit(arch, patches)
}

pub fn remove_node_from_any_container(arch: &Architecture, id: &str) -> Mutation {
    commit(arch, detach_patches(arch, id))
}

pub fn update_node_field(
    arch: &Architecture,
    id: &str,
    field: NodeField,
    value: Option<String>,
) -> Mutation {
    let Some(node) = arch.node(id) else {
        return ignored(arch, "updateField", id);
    };
    let current = match field {
        NodeField::Name => Some(node.name.clone()),
        NodeField::Description => node.description.clone(),
        NodeField::DataClassification => node.data_classification.clone(),
    };
    if current == value {
        return Mutation::unchanged(arch);
    }
    commit(
        arch,
        vec![Patch::UpdateField {
            target: id.to_string(),
            field: field.into(),
            value,
        }],
    )
}

pub fn update_relationship_field(
    arch: &Architecture,
    id: &str,
    field: RelationshipField,
    value: Option<String>,
) -> Mutation {
    let Some(rel) = arch.relationship(id) else {
        return ignored(arch, "updateField", id);
    };
    let current = match field {
        RelationshipField::Description => &rel.description,
        RelationshipField::Protocol => &rel.protocol,
    };
    if *current == value {
        return Mutation::unchanged(arch);
    }
    commit(
        arch,
        vec![Patch::UpdateField {
            target: id.to_string(),
            field: Field::from(field),
            value,
        }],
    )
}

pub fn set_control(arch: &Architecture, key: &str, control: Control) -> Mutation {
    if arch.controls.get(key) == Some(&control) {
        return Mutation::unchanged(arch);
    }
    commit(
        arch,
        vec![Patch::SetControl {
            target: key.to_string(),
            value: control,
        }],
    )
}

pub fn remove_control(arch: &Architecture, key: &str) -> Mutation {
    if !arch.controls.contains_key(key) {
        return ignored(arch, "removeControl", key);
    }
    commit(
        arch,
        vec![Patch::RemoveControl {
            target: key.to_string(),
        }],
    )
}

/// Replaces the node's capability set in the active decorator mapping. Duplicate keys collapse
/// to their first occurrence; an empty list removes the mapping entry.
pub fn set_capabilities(arch: &Architecture, node_id: &str, keys: &[String]) -> Mutation {
    if !arch.has_node(node_id) {
        return ignored(arch, "setCapabilities", node_id);
    }
    let mut value: Vec<String> = Vec::with_capacity(keys.len());
    for k in keys {
        if !value.contains(k) {
            value.push(k.clone());
        }
    }
    let current: Vec<String> = arch
        .capabilities_of(node_id)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default();
    if current == value {
        return Mutation::unchanged(arch);
    }
    commit(
        arch,
        vec![Patch::SetCapabilities {
            target: node_id.to_string(),
            value,
        }],
    )
}

pub fn set_interfaces(arch: &Architecture, node_id: &str, interfaces: Vec<Interface>) -> Mutation {
    let Some(node) = arch.node(node_id) else {
        return ignored(arch, "setInterfaces", node_id);
    };
    if node.interfaces == interfaces {
        return Mutation::unchanged(arch);
    }
    commit(
        arch,
        vec![Patch::SetInterfaces {
            target: node_id.to_string(),
            value: interfaces,
        }],
    )
}

/// First free relationship id derived from `base` (`base`, `base-2`, `base-3`, ...).
pub fn unique_relationship_id(arch: &Architecture, base: &str) -> String {
    if !arch.has_relationship(base) {
        return base.to_string();
    }
    for i in 2usize.. {
        let candidate = format!("{base}-{i}");
        if !arch.has_relationship(&candidate) {
            return candidate;
        }
    }
    unreachable!()
}
