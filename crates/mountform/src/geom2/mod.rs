//! Planar geometry: convex hull and minimum-area bounding rectangle.
//!
//! Purpose
//! - Find the rotation that makes a point set's tightest bounding rectangle
//!   axis-aligned. Used by the mesh aligner (XY projection of all vertices)
//!   and by scale calibration (reference card outline).
//!
//! Method
//! - The minimum-area rectangle enclosing a convex polygon has one side
//!   collinear with a hull edge, so testing every hull-edge angle is exact.
//!   No principal-axis estimate is used anywhere in this crate.
//!
//! Code cross-refs: `convex_hull`, `min_area_rect`, `GeomCfg`

mod calipers;
mod hull;
mod types;

pub use calipers::{min_area_rect, min_area_rect_of_hull, quarter_turn_residual};
pub use hull::convex_hull;
pub use types::{GeomCfg, MinAreaRect};
