//! Label types carried by [`crate::Graph`].
//!
//! Node coordinates follow the Dagre convention: `x`/`y` are node *centers*.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

impl RankDir {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TB" | "TD" => Some(Self::TB),
            "BT" => Some(Self::BT),
            "LR" => Some(Self::LR),
            "RL" => Some(Self::RL),
            _ => None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDir::LR | RankDir::RL)
    }
}

#[derive(Debug, Clone)]
pub struct GraphLabel {
    pub rankdir: RankDir,
    pub nodesep: f64,
    pub ranksep: f64,
    /// Spacing used next to dummy nodes of long edges.
    pub edgesep: f64,
    pub marginx: f64,
    pub marginy: f64,
    /// Inner padding of compound nodes, on every side.
    pub cluster_padding: f64,
    /// Extra room above a compound node's children for its title.
    pub cluster_header: f64,
    /// Barycenter sweeps (each sweep runs down then up).
    pub order_iterations: usize,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 50.0,
            ranksep: 50.0,
            edgesep: 10.0,
            marginx: 0.0,
            marginy: 0.0,
            cluster_padding: 20.0,
            cluster_header: 40.0,
            order_iterations: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Rank within the node's own nesting level.
    pub rank: Option<i32>,
    /// Position within the rank.
    pub order: Option<usize>,
}

impl NodeLabel {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLabel {
    pub minlen: usize,
    pub weight: f64,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            weight: 1.0,
        }
    }
}
