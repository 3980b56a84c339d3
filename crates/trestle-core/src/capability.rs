//! Capability-model summary handed to the side panel.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityNode {
    pub key: String,
    /// 1 for roots.
    pub level: u32,
    pub name: String,
    pub description: String,
    pub child_keys: Vec<String>,
    pub parent_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityModel {
    pub nodes: Vec<CapabilityNode>,
}

impl CapabilityModel {
    /// Builds the tree from a flat catalog. Entries whose parent is unknown, or whose parent
    /// chain loops, are promoted to roots. Later duplicates of a key are ignored.
    pub fn from_catalog(catalog: &[CapabilityDefinition]) -> Self {
        let mut defs: IndexMap<&str, &CapabilityDefinition> = IndexMap::new();
        for def in catalog {
            defs.entry(def.key.as_str()).or_insert(def);
        }

        fn parent_of<'a>(
            defs: &IndexMap<&'a str, &'a CapabilityDefinition>,
            key: &str,
        ) -> Option<&'a str> {
            let parent = defs.get(key)?.parent_key.as_deref()?;
            defs.get_key_value(parent).map(|(k, _)| *k)
        }

        fn on_cycle(defs: &IndexMap<&str, &CapabilityDefinition>, key: &str) -> bool {
            let mut cur = parent_of(defs, key);
            for _ in 0..defs.len() {
                match cur {
                    Some(p) if p == key => return true,
                    Some(p) => cur = parent_of(defs, p),
                    None => return false,
                }
            }
            false
        }

        let mut resolved_parent: IndexMap<&str, Option<&str>> = IndexMap::new();
        for &key in defs.keys() {
            if on_cycle(&defs, key) {
                tracing::warn!(key, "capability parent chain loops; treating as root");
                resolved_parent.insert(key, None);
            } else {
                resolved_parent.insert(key, parent_of(&defs, key));
            }
        }

        let mut levels: IndexMap<&str, u32> = IndexMap::new();
        for &key in defs.keys() {
            let mut level = 1u32;
            let mut cur = resolved_parent.get(key).copied().flatten();
            while let Some(p) = cur {
                level += 1;
                cur = resolved_parent.get(p).copied().flatten();
                if level as usize > defs.len() {
                    break;
                }
            }
            levels.insert(key, level);
        }

        let mut children: IndexMap<&str, Vec<String>> = IndexMap::new();
        for (&key, parent) in &resolved_parent {
            if let Some(p) = parent {
                children.entry(*p).or_default().push(key.to_string());
            }
        }

        let nodes = defs
            .iter()
            .map(|(&key, def)| CapabilityNode {
                key: key.to_string(),
                level: levels.get(key).copied().unwrap_or(1),
                name: def.name.clone(),
                description: def.description.clone(),
                child_keys: children.get(key).cloned().unwrap_or_default(),
                parent_key: resolved_parent
                    .get(key)
                    .copied()
                    .flatten()
                    .map(str::to_string),
            })
            .collect();
        Self { nodes }
    }

    pub fn get(&self, key: &str) -> Option<&CapabilityNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn roots(&self) -> impl Iterator<Item = &CapabilityNode> {
        self.nodes.iter().filter(|n| n.parent_key.is_none())
    }
}
