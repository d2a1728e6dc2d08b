//! Horizontal scan-line profiling and stitching.

use nalgebra::Vector2;

use super::{Contour, ContourError, ContourResult};

/// Edges whose Y-span is at most this are treated as horizontal and skipped.
const MIN_EDGE_SPAN: f64 = 1e-9;

/// Outer crossing interval of one scan level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanLevel {
    pub y: f64,
    /// `(min_x, max_x)` of the crossings, `None` with fewer than two.
    pub span: Option<(f64, f64)>,
}

impl ScanLevel {
    #[inline]
    pub fn half_width(&self) -> Option<f64> {
        self.span.map(|(lo, hi)| 0.5 * (hi - lo))
    }
}

/// Per-level results plus the symmetric left/right point sequences, both in
/// order of increasing `y`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanProfile {
    pub levels: Vec<ScanLevel>,
    pub left: Vec<Vector2<f64>>,
    pub right: Vec<Vector2<f64>>,
    pub skipped: usize,
}

/// `n` evenly spaced values over `[lo, hi]`, both ends included.
///
/// `n = 0` gives nothing, `n = 1` gives `[lo]`; the last value is `hi` exactly.
pub fn levels(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Sorted X coordinates where the horizontal line at `y` crosses the contour.
///
/// An edge counts when `y` lies in its closed Y-span; a vertex hit exactly
/// therefore shows up once per adjacent edge.
pub fn crossings(contour: &Contour, y: f64) -> Vec<f64> {
    let mut xs: Vec<f64> = contour
        .edges()
        .filter_map(|(a, b)| {
            let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
            if y < y0 || y > y1 || y1 - y0 <= MIN_EDGE_SPAN {
                return None;
            }
            Some(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y))
        })
        .collect();
    xs.sort_by(f64::total_cmp);
    xs
}

/// Scan `slices` levels across the contour's Y range and record the
/// symmetric half-width at each one.
pub fn scan_profile(contour: &Contour, slices: usize) -> ScanProfile {
    let mut profile = ScanProfile::default();
    let Some((lo, hi)) = contour.bounds() else {
        return profile;
    };
    for y in levels(lo.y, hi.y, slices) {
        let xs = crossings(contour, y);
        let span = match (xs.first(), xs.last()) {
            (Some(&a), Some(&b)) if xs.len() >= 2 => Some((a, b)),
            _ => None,
        };
        let level = ScanLevel { y, span };
        match level.half_width() {
            Some(hw) => {
                profile.left.push(Vector2::new(-hw, y));
                profile.right.push(Vector2::new(hw, y));
            }
            None => {
                tracing::trace!(y, crossings = xs.len(), "scan level skipped");
                profile.skipped += 1;
            }
        }
        profile.levels.push(level);
    }
    profile
}

/// Join the profile into one ring: left side in level order, then the right
/// side reversed.
pub fn stitch(profile: &ScanProfile) -> ContourResult<Contour> {
    if profile.left.is_empty() {
        return Err(ContourError::EmptyProfile {
            levels: profile.levels.len(),
        });
    }
    let points = profile
        .left
        .iter()
        .chain(profile.right.iter().rev())
        .copied()
        .collect();
    Ok(Contour { points })
}
