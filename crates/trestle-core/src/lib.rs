#![forbid(unsafe_code)]

//! Architecture model + pure mutation engine (headless).
//!
//! Design goals:
//! - every edit is a pure function returning the next snapshot and an ordered patch batch
//! - stale ids are no-ops, never errors
//! - patches replay deterministically on another copy of the same model

pub mod capability;
pub mod config;
pub mod edit;
pub mod error;
pub mod factory;
pub mod model;
pub mod mutation;
pub mod patch;

pub use capability::{CapabilityDefinition, CapabilityModel, CapabilityNode};
pub use config::ConfigValue;
pub use edit::{EditIntent, apply_script};
pub use error::{Error, Result};
pub use factory::{DiagramType, create_default_node, create_default_relationship};
pub use model::{
    Architecture, CapabilityEntry, Control, ControlRequirement, Decorator, Flow, Interface, Node,
    NodeKind, Relationship, RelationshipKind, Transition,
};
pub use mutation::Mutation;
pub use patch::{Field, NodeField, Patch, RelationshipField};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests;
