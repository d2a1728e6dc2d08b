//! Pixel-to-physical scale from a reference rectangle of known size.

use super::{Contour, ContourError, ContourResult};
use crate::geom2::{min_area_rect, GeomCfg, MinAreaRect};

/// Nominal side lengths of the reference object, physical units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reference {
    pub long: f64,
    pub short: f64,
}

impl Reference {
    /// ISO/IEC 7810 ID-1 card, millimetres.
    pub const ID1_CARD: Self = Self {
        long: 85.60,
        short: 53.98,
    };
}

impl Default for Reference {
    fn default() -> Self {
        Self::ID1_CARD
    }
}

/// Scale derived from a reference outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    /// Pixels per unit from the long side; this is the one to use.
    pub pixels_per_unit: f64,
    /// Same ratio from the short side. Disagreement with `pixels_per_unit`
    /// hints at perspective skew or a misidentified reference.
    pub short_side_ppu: f64,
    pub rect: MinAreaRect,
}

impl Calibration {
    /// `short_side_ppu / pixels_per_unit`; 1 for an undistorted reference.
    #[inline]
    pub fn aspect_agreement(&self) -> f64 {
        self.short_side_ppu / self.pixels_per_unit
    }
}

/// Fit the minimum-area rectangle to `reference` and match its long side to
/// `dims.long`.
pub fn calibrate(reference: &Contour, dims: Reference, cfg: GeomCfg) -> ContourResult<Calibration> {
    let rect = min_area_rect(&reference.points, cfg).ok_or(ContourError::DegenerateHull {
        points: reference.len(),
    })?;
    let pixels_per_unit = rect.long_side() / dims.long;
    if !valid_scale(pixels_per_unit) {
        return Err(ContourError::InvalidScale(pixels_per_unit));
    }
    let cal = Calibration {
        pixels_per_unit,
        short_side_ppu: rect.short_side() / dims.short,
        rect,
    };
    tracing::info!(
        long_px = rect.long_side(),
        short_px = rect.short_side(),
        ppu = cal.pixels_per_unit,
        short_ppu = cal.short_side_ppu,
        "reference calibrated"
    );
    if (cal.aspect_agreement() - 1.0).abs() > 0.05 {
        tracing::warn!(
            ratio = cal.aspect_agreement(),
            "reference sides disagree by more than 5%; perspective skew?"
        );
    }
    Ok(cal)
}

/// Divide every coordinate by `pixels_per_unit`.
pub fn to_units(contour: &Contour, pixels_per_unit: f64) -> ContourResult<Contour> {
    if !valid_scale(pixels_per_unit) {
        return Err(ContourError::InvalidScale(pixels_per_unit));
    }
    Ok(contour.scaled(pixels_per_unit.recip()))
}

#[inline]
fn valid_scale(s: f64) -> bool {
    s.is_finite() && s > 0.0
}
