//! Tolerances and result types for planar geometry.
//!
//! - `GeomCfg`: centralizes the epsilons for point dedup and area ties.
//! - `MinAreaRect`: winning hull-edge rotation and the rectangle it yields.

use nalgebra::Vector2;

/// Geometry configuration (tolerances).
#[derive(Clone, Copy, Debug)]
pub struct GeomCfg {
    /// Points closer than this are treated as one before hulling.
    pub eps_dedup: f64,
    /// Relative slack when comparing candidate rectangle areas. Edges within
    /// this fraction of the minimum count as tied.
    pub eps_area_rel: f64,
}

impl Default for GeomCfg {
    fn default() -> Self {
        Self {
            eps_dedup: 1e-12,
            eps_area_rel: 1e-9,
        }
    }
}

/// Minimum-area rectangle found by testing every hull edge.
///
/// `width` runs along the winning edge, `height` perpendicular to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinAreaRect {
    /// Direction angle of the winning hull edge (radians, `atan2` range).
    pub angle: f64,
    pub area: f64,
    pub width: f64,
    pub height: f64,
    /// Rectangle center in the input frame.
    pub center: Vector2<f64>,
    /// Index `k` of the winning edge `hull[k] → hull[k+1]`.
    pub edge: usize,
}

impl MinAreaRect {
    #[inline]
    pub fn long_side(&self) -> f64 {
        self.width.max(self.height)
    }
    #[inline]
    pub fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }
}
