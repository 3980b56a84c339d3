//! Compound layered graph layout.
//!
//! A small Sugiyama-style pipeline (cycle breaking, longest-path ranking, barycenter crossing
//! reduction, median coordinate assignment) applied level by level over a compound graph, so
//! nested nodes are laid out inside their parents and parents grow to fit them.

#![forbid(unsafe_code)]

pub mod acyclic;
mod compound;
pub mod coordinate_system;
mod error;
mod graph;
pub mod layer;
mod model;
pub mod order;
pub mod pipeline;
pub mod position;
pub mod rank;

pub use error::{Error, Result};
pub use graph::{Edge, Graph};
pub use model::{EdgeLabel, GraphLabel, NodeLabel, RankDir};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lays out `g` in place: every node gets `x`/`y` (absolute centers), `rank` and `order`, and
/// compound nodes are resized to enclose their children.
pub fn layout(g: &mut Graph) -> Result<()> {
    compound::run(g)
}
