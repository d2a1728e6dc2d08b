//! Minimum-area rectangle by exhaustive hull-edge rotation.
//!
//! For every hull edge `hull[k] → hull[k+1]` with direction angle `θ_k`, the
//! hull is rotated by `−θ_k` and its axis-aligned bounding box measured.
//!
//! Edges whose area is within `GeomCfg::eps_area_rel` (relative) of the
//! minimum all tie. Among them the one needing the smallest residual rotation
//! (`quarter_turn_residual`) wins, then the first in hull order. An already
//! aligned point set therefore always reports a residual of zero, whatever
//! vertex the hull happens to start at.

use nalgebra::{Rotation2, Vector2};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::hull::convex_hull;
use super::types::{GeomCfg, MinAreaRect};

/// Minimum-area rectangle of an arbitrary point set. `None` if the hull has
/// fewer than three points (all points coincide or are collinear).
pub fn min_area_rect(points: &[Vector2<f64>], cfg: GeomCfg) -> Option<MinAreaRect> {
    let hull = convex_hull(points, cfg);
    min_area_rect_of_hull(&hull, cfg)
}

/// Minimum-area rectangle of a hull already in boundary order.
pub fn min_area_rect_of_hull(hull: &[Vector2<f64>], cfg: GeomCfg) -> Option<MinAreaRect> {
    let n = hull.len();
    if n < 3 {
        return None;
    }
    let candidates: Vec<MinAreaRect> = (0..n).map(|k| edge_rect(hull, k)).collect();
    let min_area = candidates.iter().map(|r| r.area).fold(f64::INFINITY, f64::min);
    let slack = cfg.eps_area_rel * min_area.abs();
    candidates
        .into_iter()
        .filter(|r| r.area <= min_area + slack)
        .min_by(|a, b| {
            let (ra, rb) = (quarter_turn_residual(a.angle), quarter_turn_residual(b.angle));
            ra.abs().total_cmp(&rb.abs())
        })
}

/// Bounding rectangle of `hull` aligned with edge `k`.
fn edge_rect(hull: &[Vector2<f64>], k: usize) -> MinAreaRect {
    let edge = hull[(k + 1) % hull.len()] - hull[k];
    let angle = edge.y.atan2(edge.x);
    let rot = Rotation2::new(-angle);
    let (lo, hi) = bounds(hull.iter().map(|&p| rot * p));
    let extent = hi - lo;
    MinAreaRect {
        angle,
        area: extent.x * extent.y,
        width: extent.x,
        height: extent.y,
        center: rot.inverse() * ((lo + hi) * 0.5),
        edge: k,
    }
}

/// Reduce an angle modulo π/2 into `(−π/4, π/4]`.
///
/// Quarter turns map a bounding rectangle onto itself, so the residual is the
/// smallest rotation that makes the same rectangle axis-aligned.
pub fn quarter_turn_residual(angle: f64) -> f64 {
    let r = angle.rem_euclid(FRAC_PI_2);
    if r > FRAC_PI_4 {
        r - FRAC_PI_2
    } else {
        r
    }
}

fn bounds(points: impl Iterator<Item = Vector2<f64>>) -> (Vector2<f64>, Vector2<f64>) {
    let mut lo = Vector2::repeat(f64::INFINITY);
    let mut hi = Vector2::repeat(f64::NEG_INFINITY);
    for p in points {
        lo = lo.inf(&p);
        hi = hi.sup(&p);
    }
    (lo, hi)
}
