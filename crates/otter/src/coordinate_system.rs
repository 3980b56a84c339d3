//! Coordinate system adjustment helpers.
//!
//! The pipeline assumes a top-to-bottom frame. For left-to-right / right-to-left layouts sizes
//! are swapped on the way in and coordinates are swapped (and mirrored) on the way out.

use crate::RankDir;

pub fn adjust_size(rankdir: RankDir, (width, height): (f64, f64)) -> (f64, f64) {
    if rankdir.is_horizontal() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Maps a center from the top-to-bottom frame back to `rankdir`, given the frame's extent
/// along the rank axis.
pub fn undo_point(rankdir: RankDir, (x, y): (f64, f64), rank_extent: f64) -> (f64, f64) {
    let y = match rankdir {
        RankDir::BT | RankDir::RL => rank_extent - y,
        RankDir::TB | RankDir::LR => y,
    };
    if rankdir.is_horizontal() {
        (y, x)
    } else {
        (x, y)
    }
}
