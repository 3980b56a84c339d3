//! Canonical in-memory architecture model.
//!
//! Snapshots are immutable by convention: every change goes through [`crate::mutation`] so it can
//! be expressed as a [`crate::Patch`] batch.

use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet as HashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    System,
    Actor,
    Service,
    Database,
    Network,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::System,
        NodeKind::Actor,
        NodeKind::Service,
        NodeKind::Database,
        NodeKind::Network,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::System => "system",
            NodeKind::Actor => "actor",
            NodeKind::Service => "service",
            NodeKind::Database => "database",
            NodeKind::Network => "network",
        }
    }

    /// Kinds that group other nodes on the canvas.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::System | NodeKind::Network)
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s.trim())
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(rename = "unique-id")]
    pub unique_id: String,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Node {
    pub unique_id: String,
    pub node_type: NodeKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    Interacts {
        actor: String,
        nodes: Vec<String>,
    },
    ComposedOf {
        container: String,
        nodes: Vec<String>,
    },
    Connects {
        source: String,
        target: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        interfaces: Vec<String>,
    },
}

impl RelationshipKind {
    /// Every node id this relationship points at, anchors first.
    pub fn node_ids(&self) -> Vec<&str> {
        match self {
            RelationshipKind::Interacts { actor, nodes } => std::iter::once(actor.as_str())
                .chain(nodes.iter().map(String::as_str))
                .collect(),
            RelationshipKind::ComposedOf { container, nodes } => {
                std::iter::once(container.as_str())
                    .chain(nodes.iter().map(String::as_str))
                    .collect()
            }
            RelationshipKind::Connects { source, target, .. } => {
                vec![source.as_str(), target.as_str()]
            }
        }
    }

    pub fn references(&self, node_id: &str) -> bool {
        self.node_ids().contains(&node_id)
    }

    /// The node a multi-member relationship hangs off (actor or container).
    pub fn anchor(&self) -> Option<&str> {
        match self {
            RelationshipKind::Interacts { actor, .. } => Some(actor),
            RelationshipKind::ComposedOf { container, .. } => Some(container),
            RelationshipKind::Connects { .. } => None,
        }
    }

    pub fn members(&self) -> Option<&[String]> {
        match self {
            RelationshipKind::Interacts { nodes, .. }
            | RelationshipKind::ComposedOf { nodes, .. } => Some(nodes),
            RelationshipKind::Connects { .. } => None,
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            RelationshipKind::Interacts { nodes, .. }
            | RelationshipKind::ComposedOf { nodes, .. } => Some(nodes),
            RelationshipKind::Connects { .. } => None,
        }
    }

    pub fn is_composed_of(&self) -> bool {
        matches!(self, RelationshipKind::ComposedOf { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Relationship {
    pub unique_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub relationship_type: RelationshipKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Transition {
    pub relationship_unique_id: String,
    pub sequence_number: u32,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Flow {
    pub unique_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityEntry {
    #[serde(default)]
    pub capabilities: IndexSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decorator {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub mappings: IndexMap<String, CapabilityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ControlRequirement {
    pub requirement_url: String,
    pub config_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Control {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<ControlRequirement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<Flow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<Decorator>,
    #[serde(default)]
    pub controls: IndexMap<String, Control>,
}

impl Architecture {
    pub fn from_json(text: &str) -> Result<Self> {
        let arch: Architecture = serde_json::from_str(text)?;
        arch.validate()?;
        Ok(arch)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.unique_id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.unique_id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn relationship(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.unique_id == id)
    }

    pub fn relationship_mut(&mut self, id: &str) -> Option<&mut Relationship> {
        self.relationships.iter_mut().find(|r| r.unique_id == id)
    }

    pub fn has_relationship(&self, id: &str) -> bool {
        self.relationship(id).is_some()
    }

    pub fn flow_mut(&mut self, id: &str) -> Option<&mut Flow> {
        self.flows.iter_mut().find(|f| f.unique_id == id)
    }

    /// Relationships in which `node_id` appears in any role.
    pub fn relationships_touching(&self, node_id: &str) -> impl Iterator<Item = &Relationship> {
        self.relationships
            .iter()
            .filter(move |r| r.relationship_type.references(node_id))
    }

    /// The `composed-of` relationship listing `node_id` as a child, if any.
    pub fn composed_of_membership(&self, node_id: &str) -> Option<&Relationship> {
        self.composed_of_memberships(node_id).next()
    }

    /// Every `composed-of` relationship listing `node_id`. A well-formed model has at most one,
    /// but loaded files are not guaranteed to be.
    pub fn composed_of_memberships<'a, 'b>(
        &'a self,
        node_id: &'b str,
    ) -> impl Iterator<Item = &'a Relationship> + use<'a, 'b> {
        self.relationships
            .iter()
            .filter(move |r| match &r.relationship_type {
                RelationshipKind::ComposedOf { nodes, .. } => nodes.iter().any(|n| n == node_id),
                _ => false,
            })
    }

    pub fn container_of(&self, node_id: &str) -> Option<&str> {
        match &self.composed_of_membership(node_id)?.relationship_type {
            RelationshipKind::ComposedOf { container, .. } => Some(container.as_str()),
            _ => None,
        }
    }

    /// Direct children of `container_id`, in relationship order.
    pub fn children_of(&self, container_id: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.relationships {
            if let RelationshipKind::ComposedOf { container, nodes } = &r.relationship_type {
                if container == container_id {
                    out.extend(nodes.iter().map(String::as_str));
                }
            }
        }
        out
    }

    pub fn is_container(&self, node_id: &str) -> bool {
        self.node(node_id)
            .is_some_and(|n| n.node_type.is_container())
            || !self.children_of(node_id).is_empty()
    }

    /// Whether `candidate` sits below `ancestor` in the containment tree.
    pub fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        let mut seen: HashSet<&str> = HashSet::default();
        let mut cur = self.container_of(candidate);
        while let Some(parent) = cur {
            if parent == ancestor {
                return true;
            }
            if !seen.insert(parent) {
                return false;
            }
            cur = self.container_of(parent);
        }
        false
    }

    pub fn active_decorator(&self) -> Option<&Decorator> {
        self.decorators.first()
    }

    pub fn capabilities_of(&self, node_id: &str) -> Option<&IndexSet<String>> {
        self.active_decorator()?
            .mappings
            .get(node_id)
            .map(|entry| &entry.capabilities)
    }

    /// Referential integrity: unique ids, known endpoints, acyclic containment.
    pub fn validate(&self) -> Result<()> {
        let mut node_ids: HashSet<&str> = HashSet::default();
        for n in &self.nodes {
            if !node_ids.insert(n.unique_id.as_str()) {
                return Err(Error::InvalidArchitecture {
                    message: format!("duplicate node id [{}]", n.unique_id),
                });
            }
        }

        let mut rel_ids: HashSet<&str> = HashSet::default();
        for r in &self.relationships {
            if !rel_ids.insert(r.unique_id.as_str()) {
                return Err(Error::InvalidArchitecture {
                    message: format!("duplicate relationship id [{}]", r.unique_id),
                });
            }
            for endpoint in r.relationship_type.node_ids() {
                if !node_ids.contains(endpoint) {
                    return Err(Error::InvalidArchitecture {
                        message: format!(
                            "relationship [{}] references unknown node [{endpoint}]",
                            r.unique_id
                        ),
                    });
                }
            }
        }

        for flow in &self.flows {
            for t in &flow.transitions {
                if !rel_ids.contains(t.relationship_unique_id.as_str()) {
                    return Err(Error::InvalidArchitecture {
                        message: format!(
                            "flow [{}] references unknown relationship [{}]",
                            flow.unique_id, t.relationship_unique_id
                        ),
                    });
                }
            }
        }

        for n in &self.nodes {
            if self.is_descendant(&n.unique_id, &n.unique_id) {
                return Err(Error::InvalidArchitecture {
                    message: format!("node [{}] is nested inside itself", n.unique_id),
                });
            }
        }

        Ok(())
    }
}
