//! Persisted visual geometry, independent of the architecture model.
//!
//! Positions are absolute canvas coordinates of each node's top-left corner. Reading is lenient
//! per entry: a malformed node or edge entry degrades to an empty one (and so falls through to
//! automatic placement) instead of failing the whole record. Unknown top-level fields are kept
//! in [`Layout::extensions`] and written back unchanged.

use crate::adapter::PlacedNode;
use crate::geom::{Point, Rect, point, rect};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use trestle_core::DiagramType;

pub const LAYOUT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedNodeGeometry {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_f64"
    )]
    pub x: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_f64"
    )]
    pub y: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_f64"
    )]
    pub width: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_f64"
    )]
    pub height: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_bool"
    )]
    pub collapsed: Option<bool>,
}

impl SavedNodeGeometry {
    /// The saved rectangle, if the entry is complete and finite. Only such entries pin a node.
    pub fn pinned_rect(&self) -> Option<Rect> {
        let (x, y, w, h) = (self.x?, self.y?, self.width?, self.height?);
        let finite = [x, y, w, h].iter().all(|v| v.is_finite());
        (finite && w >= 0.0 && h >= 0.0).then(|| rect(x, y, w, h))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEdgeGeometry {
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<Waypoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layout {
    pub version: u32,
    #[serde(deserialize_with = "lenient_diagram_type")]
    pub diagram_type: DiagramType,
    pub viewport: Viewport,
    #[serde(deserialize_with = "lenient_map")]
    pub nodes: IndexMap<String, SavedNodeGeometry>,
    #[serde(deserialize_with = "lenient_map")]
    pub edges: IndexMap<String, SavedEdgeGeometry>,
    pub grid_size: f64,
    pub snap_to_grid: bool,
    pub last_modified: DateTime<Utc>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::empty(DiagramType::default())
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(|v| v.as_f64()))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<bool>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(|v| v.as_bool()))
}

fn lenient_diagram_type<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<DiagramType, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(DiagramType::parse)
        .unwrap_or_default())
}

fn lenient_map<'de, D, T>(d: D) -> std::result::Result<IndexMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Option::<IndexMap<String, Value>>::deserialize(d)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(id, value)| {
            let entry = serde_json::from_value(value).unwrap_or_else(|err| {
                tracing::debug!(id = %id, error = %err, "ignoring malformed layout entry");
                T::default()
            });
            (id, entry)
        })
        .collect())
}

impl Layout {
    pub fn empty(diagram_type: DiagramType) -> Self {
        Self {
            version: LAYOUT_VERSION,
            diagram_type,
            viewport: Viewport::default(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            grid_size: 20.0,
            snap_to_grid: false,
            last_modified: DateTime::<Utc>::default(),
            extensions: Map::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let layout: Layout = serde_json::from_str(text).map_err(Error::Json)?;
        if layout.version > LAYOUT_VERSION {
            tracing::warn!(
                version = layout.version,
                supported = LAYOUT_VERSION,
                "layout was written by a newer version; reading known fields only"
            );
        }
        Ok(layout)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn pinned(&self, id: &str) -> Option<Rect> {
        self.nodes.get(id)?.pinned_rect()
    }

    fn snap(&self, v: f64) -> f64 {
        if self.snap_to_grid && self.grid_size > 0.0 {
            (v / self.grid_size).round() * self.grid_size
        } else {
            v
        }
    }

    /// Stores the geometry of every placed node, keeping collapse flags.
    pub fn record_nodes(&mut self, placed: &[PlacedNode]) {
        for p in placed {
            let entry = self.nodes.entry(p.id.clone()).or_default();
            entry.x = Some(p.x);
            entry.y = Some(p.y);
            entry.width = Some(p.width);
            entry.height = Some(p.height);
        }
    }

    /// `p` rounded to the grid when snapping is enabled.
    pub fn snap_point(&self, p: Point) -> Point {
        point(self.snap(p.x), self.snap(p.y))
    }

    /// Moves a node's top-left corner, snapping to the grid when enabled. Non-finite input is
    /// ignored.
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) {
        let p = self.snap_point(point(x, y));
        self.set_origin(id, p.x, p.y);
    }

    /// Stores a node's top-left corner as given, without snapping. Non-finite input is ignored.
    pub fn set_origin(&mut self, id: &str, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let entry = self.nodes.entry(id.to_string()).or_default();
        entry.x = Some(x);
        entry.y = Some(y);
    }

    pub fn resize_node(&mut self, id: &str, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            return;
        }
        let entry = self.nodes.entry(id.to_string()).or_default();
        entry.width = Some(width);
        entry.height = Some(height);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_collapsed(&mut self, id: &str, collapsed: bool) {
        if collapsed {
            self.nodes.entry(id.to_string()).or_default().collapsed = Some(true);
        } else if let Some(entry) = self.nodes.get_mut(id) {
            entry.collapsed = None;
        }
    }

    pub fn set_edge_waypoints(&mut self, id: &str, waypoints: Vec<Waypoint>) {
        self.edges.entry(id.to_string()).or_default().waypoints = waypoints;
    }

    pub fn stamp(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }
}
