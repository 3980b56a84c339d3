#![forbid(unsafe_code)]

//! Canvas geometry for trestle diagrams.
//!
//! Everything here is derived from a `trestle_core::Architecture` plus a persisted [`Layout`]
//! record: the visual projection, automatic layout with pinned positions and a deterministic
//! fallback, containment detection, edge handle assignment, and the collapse/drag state
//! machines. All functions are synchronous and pure except [`LayoutAdapter`], whose placement
//! is asynchronous and runtime-agnostic.

pub mod adapter;
pub mod collapse;
pub mod config;
pub mod containment;
pub mod debounce;
pub mod drag;
pub mod error;
mod fallback;
pub mod geom;
pub mod handles;
mod hierarchy;
pub mod layout_record;
pub mod session;
pub mod visual;

pub use adapter::{
    LayeredEngine, LayoutAdapter, LayoutEngine, LayoutGate, LayoutOptions, LayoutOutcome,
    LayoutRequest, LayoutRequestId, PendingLayout, PlacedNode, layout_request,
};
pub use collapse::{CollapseMode, CollapseState};
pub use config::{CanvasConfig, DirectionOptions, FallbackGrid};
pub use containment::{NodeRect, find_container_at_point, resolve_absolute};
pub use debounce::{SaveDebouncer, SaveRequest};
pub use drag::{DragMachine, DragState, DropPayload};
pub use error::{Error, LayoutError, Result};
pub use fallback::fallback_grid;
pub use handles::{Side, assign_edge_handles};
pub use layout_record::{
    LAYOUT_VERSION, Layout, SavedEdgeGeometry, SavedNodeGeometry, Viewport, Waypoint,
};
pub use session::{CanvasSnapshot, EditorSession, RenderNode};
pub use visual::{Projection, ProjectionCache, VisualEdge, VisualEdgeKind, VisualNode, project};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
