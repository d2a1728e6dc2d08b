//! Closed planar contours and the symmetrizer pipeline.
//!
//! Purpose
//! - Turn a hand-traced outline into an idealized left/right symmetric
//!   silhouette: recenter on the vertex centroid, half turn, scan-line
//!   profile, stitch.
//! - Convert pixel-space traces to physical units (`calibrate`, `to_units`)
//!   and thin them out (`simplify_closed`) before they are written.
//!
//! Conventions
//! - A `Contour` is an implicitly closed ring; edge `k` runs from `points[k]`
//!   to `points[(k + 1) % n]`. There is never an explicit closing duplicate.
//! - Interior structure (holes, concavities crossing a scan level) is not
//!   preserved by the symmetrizer; only the outermost crossings count.

mod calibrate;
mod scan;
mod simplify;

use nalgebra::Vector2;
use thiserror::Error;

pub use calibrate::{calibrate, to_units, Calibration, Reference};
pub use scan::{crossings, levels, scan_profile, stitch, ScanLevel, ScanProfile};
pub use simplify::{relative_epsilon, simplify_closed};

/// Result type alias for contour operations.
pub type ContourResult<T> = Result<T, ContourError>;

/// Errors raised by the symmetrizer and calibration.
#[derive(Debug, Error)]
pub enum ContourError {
    /// Fewer than three points cannot enclose anything.
    #[error("contour has {count} points, need at least 3")]
    TooFewPoints { count: usize },

    /// No scan level produced two or more crossings.
    #[error("no scan level crossed the contour ({levels} levels tried)")]
    EmptyProfile { levels: usize },

    /// Reference outline collapses to a point or segment.
    #[error("reference outline is degenerate ({points} hull points, need at least 3)")]
    DegenerateHull { points: usize },

    /// Scale factor is zero, negative or not finite.
    #[error("invalid scale factor {0}")]
    InvalidScale(f64),
}

/// Ordered closed polygon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<Vector2<f64>>,
}

impl Contour {
    /// Build a contour; a trailing point equal to the first is dropped.
    pub fn new(mut points: Vec<Vector2<f64>>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Arithmetic mean of the vertices (not the area centroid).
    pub fn centroid(&self) -> Option<Vector2<f64>> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self.points.iter().fold(Vector2::zeros(), |acc, p| acc + p);
        Some(sum / self.points.len() as f64)
    }

    /// Axis-aligned bounds `(min, max)`.
    pub fn bounds(&self) -> Option<(Vector2<f64>, Vector2<f64>)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.inf(p), hi.sup(p))),
        )
    }

    /// Edges of the closed ring, including the wrap-around edge.
    pub fn edges(&self) -> impl Iterator<Item = (Vector2<f64>, Vector2<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |k| (self.points[k], self.points[(k + 1) % n]))
    }

    /// Closed perimeter length.
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.edges().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Uniformly scaled copy about the origin.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            points: self.points.iter().map(|p| p * factor).collect(),
        }
    }
}

/// Symmetrizer parameters.
#[derive(Clone, Copy, Debug)]
pub struct SymmetrizeCfg {
    /// Number of scan levels across the Y range, endpoints included.
    pub slices: usize,
}

impl Default for SymmetrizeCfg {
    fn default() -> Self {
        Self { slices: 200 }
    }
}

/// What the symmetrizer did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SymmetrizeReport {
    /// Vertex centroid removed by recentering (input frame).
    pub centroid: Vector2<f64>,
    pub levels: usize,
    /// Levels that produced a profile entry.
    pub kept: usize,
    /// Levels with fewer than two crossings.
    pub skipped: usize,
}

/// Symmetric outline plus the stage report.
#[derive(Clone, Debug)]
pub struct Symmetrized {
    pub contour: Contour,
    pub report: SymmetrizeReport,
}

/// Subtract the vertex centroid from every point. Returns the centroid.
pub fn recenter(contour: &mut Contour) -> Vector2<f64> {
    let c = contour.centroid().unwrap_or_else(Vector2::zeros);
    for p in &mut contour.points {
        *p -= c;
    }
    c
}

/// Negate every coordinate (180° about the origin).
pub fn half_turn(contour: &mut Contour) {
    for p in &mut contour.points {
        *p = -*p;
    }
}

/// Run the symmetrizer: recenter, half turn, scan-line profile, stitch.
pub fn symmetrize(mut contour: Contour, cfg: &SymmetrizeCfg) -> ContourResult<Symmetrized> {
    if contour.len() < 3 {
        return Err(ContourError::TooFewPoints { count: contour.len() });
    }
    let centroid = recenter(&mut contour);
    half_turn(&mut contour);
    tracing::debug!(cx = centroid.x, cy = centroid.y, "recentered and turned");

    let profile = scan_profile(&contour, cfg.slices);
    let report = SymmetrizeReport {
        centroid,
        levels: profile.levels.len(),
        kept: profile.left.len(),
        skipped: profile.skipped,
    };
    let out = stitch(&profile)?;
    tracing::info!(
        levels = report.levels,
        kept = report.kept,
        skipped = report.skipped,
        points = out.len(),
        "contour symmetrized"
    );
    Ok(Symmetrized { contour: out, report })
}
