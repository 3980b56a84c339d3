//! Typed canvas settings read from a [`ConfigValue`].
//!
//! The config is an explicit value threaded into the functions that need it; changing a setting
//! means building a new `CanvasConfig`.

use crate::geom::{Size, size};
use otter::RankDir;
use std::time::Duration;
use trestle_core::{ConfigValue, DiagramType, NodeKind};

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionOptions {
    pub rankdir: RankDir,
    pub node_spacing: f64,
    pub rank_spacing: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackGrid {
    pub columns: usize,
    pub column_spacing: f64,
    pub row_spacing: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    node_sizes: [Size; NodeKind::ALL.len()],
    pub container_padding: f64,
    pub header_height: f64,
    pub margin: f64,
    pub architecture: DirectionOptions,
    pub flow: DirectionOptions,
    pub fallback: FallbackGrid,
    pub max_edges_per_side: usize,
    pub save_debounce: Duration,
    pub grid_size: f64,
}

fn default_node_size(kind: NodeKind) -> Size {
    match kind {
        NodeKind::System | NodeKind::Network => size(240.0, 160.0),
        NodeKind::Service => size(160.0, 80.0),
        NodeKind::Database => size(140.0, 90.0),
        NodeKind::Actor => size(120.0, 80.0),
    }
}

fn kind_index(kind: NodeKind) -> usize {
    NodeKind::ALL.iter().position(|k| *k == kind).unwrap_or(0)
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            node_sizes: NodeKind::ALL.map(default_node_size),
            container_padding: 20.0,
            header_height: 40.0,
            margin: 20.0,
            architecture: DirectionOptions {
                rankdir: RankDir::TB,
                node_spacing: 60.0,
                rank_spacing: 80.0,
            },
            flow: DirectionOptions {
                rankdir: RankDir::LR,
                node_spacing: 50.0,
                rank_spacing: 100.0,
            },
            fallback: FallbackGrid {
                columns: 4,
                column_spacing: 220.0,
                row_spacing: 140.0,
            },
            max_edges_per_side: 3,
            save_debounce: Duration::from_millis(500),
            grid_size: 20.0,
        }
    }
}

fn read_direction(cfg: &ConfigValue, prefix: &str, defaults: &DirectionOptions) -> DirectionOptions {
    DirectionOptions {
        rankdir: cfg
            .get_str(&format!("{prefix}.direction"))
            .and_then(RankDir::parse)
            .unwrap_or(defaults.rankdir),
        node_spacing: non_negative(cfg.get_f64(&format!("{prefix}.nodeSpacing")))
            .unwrap_or(defaults.node_spacing),
        rank_spacing: non_negative(cfg.get_f64(&format!("{prefix}.rankSpacing")))
            .unwrap_or(defaults.rank_spacing),
    }
}

fn non_negative(v: Option<f64>) -> Option<f64> {
    v.filter(|v| *v >= 0.0)
}

impl CanvasConfig {
    /// Reads overrides from `cfg`, keeping the default for every missing or invalid key.
    ///
    /// Keys: `nodeSizes.<kind>.{width,height}`, `containerPadding`, `headerHeight`, `margin`,
    /// `layout.{architecture,flow}.{direction,nodeSpacing,rankSpacing}`,
    /// `fallback.{columns,columnSpacing,rowSpacing}`, `handles.maxEdgesPerSide`,
    /// `saveDebounceMs`, `gridSize`.
    pub fn from_config(cfg: &ConfigValue) -> Self {
        let d = Self::default();
        let mut node_sizes = d.node_sizes;
        for kind in NodeKind::ALL {
            let slot = &mut node_sizes[kind_index(kind)];
            if let Some(w) = non_negative(cfg.get_f64(&format!("nodeSizes.{kind}.width"))) {
                slot.width = w;
            }
            if let Some(h) = non_negative(cfg.get_f64(&format!("nodeSizes.{kind}.height"))) {
                slot.height = h;
            }
        }

        Self {
            node_sizes,
            container_padding: non_negative(cfg.get_f64("containerPadding"))
                .unwrap_or(d.container_padding),
            header_height: non_negative(cfg.get_f64("headerHeight")).unwrap_or(d.header_height),
            margin: non_negative(cfg.get_f64("margin")).unwrap_or(d.margin),
            architecture: read_direction(cfg, "layout.architecture", &d.architecture),
            flow: read_direction(cfg, "layout.flow", &d.flow),
            fallback: FallbackGrid {
                columns: cfg
                    .get_u64("fallback.columns")
                    .filter(|c| *c > 0)
                    .map(|c| c as usize)
                    .unwrap_or(d.fallback.columns),
                column_spacing: non_negative(cfg.get_f64("fallback.columnSpacing"))
                    .unwrap_or(d.fallback.column_spacing),
                row_spacing: non_negative(cfg.get_f64("fallback.rowSpacing"))
                    .unwrap_or(d.fallback.row_spacing),
            },
            max_edges_per_side: cfg
                .get_u64("handles.maxEdgesPerSide")
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(d.max_edges_per_side),
            save_debounce: cfg
                .get_u64("saveDebounceMs")
                .map(Duration::from_millis)
                .unwrap_or(d.save_debounce),
            grid_size: cfg
                .get_f64("gridSize")
                .filter(|g| *g > 0.0)
                .unwrap_or(d.grid_size),
        }
    }

    pub fn node_size(&self, kind: NodeKind) -> Size {
        self.node_sizes[kind_index(kind)]
    }

    pub fn direction(&self, diagram_type: DiagramType) -> &DirectionOptions {
        match diagram_type {
            DiagramType::Architecture => &self.architecture,
            DiagramType::Flow => &self.flow,
        }
    }
}
