//! Mesh canonicalization pipeline.
//!
//! Stages, in order:
//! 1. stable pose (most probable resting face down; see `crate::pose`)
//! 2. user flip (optional 180° about X)
//! 3. planar alignment (minimum-area rectangle of the XY hull, rotating calipers)
//! 4. landscape (X-extent ≥ Y-extent)
//! 5. top width (wider end toward the configured side)
//! 6. base leveling (min Z = 0)
//!
//! Stages 2–6 are plain functions `Mesh → Mesh` listed in `STAGES`; each
//! records what it did in the `CanonReport`. When stage 1 finds no stable
//! pose the input is returned unchanged and the remaining stages are skipped.

mod stages;

use thiserror::Error;

use crate::geom2::GeomCfg;
use crate::mesh::{Mesh, MeshError};
use crate::pose::{select_stable_pose, PoseError, StablePoseSource};

pub use stages::{
    align_planar, disambiguate_top_width, enforce_landscape, level_base, slice_widths, user_flip,
};

/// Errors that abort canonicalization.
#[derive(Debug, Error)]
pub enum CanonError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Pose(#[from] PoseError),
}

/// Which end of the part (along Y) should be the wider one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WiderEnd {
    /// Wider end at max Y.
    #[default]
    Top,
    /// Wider end at min Y.
    Bottom,
}

/// Canonicalization parameters.
#[derive(Clone, Copy, Debug)]
pub struct CanonCfg {
    /// Turn the part over (180° about X) right after pose selection.
    pub flip: bool,
    /// Fraction of the Y range that makes up the top and bottom slices
    /// compared by the top-width stage. Domain heuristic, default 0.1.
    pub slice_fraction: f64,
    /// Where the wider slice should end up. Domain heuristic, default `Top`.
    pub wider_end: WiderEnd,
    /// Relative slack for the landscape and top-width comparisons, so that
    /// rounding noise on symmetric parts does not trigger a turn.
    pub tie_eps: f64,
    /// Base leveling is skipped when `|min z|` is already below this.
    pub level_eps: f64,
    pub geom: GeomCfg,
}

impl Default for CanonCfg {
    fn default() -> Self {
        Self {
            flip: false,
            slice_fraction: 0.1,
            wider_end: WiderEnd::Top,
            tie_eps: 1e-9,
            level_eps: 1e-9,
            geom: GeomCfg::default(),
        }
    }
}

/// What each stage did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CanonReport {
    /// Probability of the chosen pose; `None` when no stable pose was found
    /// and the mesh passed through untouched.
    pub pose_probability: Option<f64>,
    pub flipped: bool,
    /// Rotation applied about Z by the planar aligner (radians).
    pub align_angle: f64,
    pub min_rect_area: f64,
    pub landscape_turned: bool,
    pub top_width: f64,
    pub bottom_width: f64,
    pub half_turned: bool,
    /// Z translation applied by base leveling.
    pub base_shift: f64,
}

impl CanonReport {
    /// True if the pipeline ran to completion (a stable pose was found).
    #[inline]
    pub fn is_canonical(&self) -> bool {
        self.pose_probability.is_some()
    }
}

/// Mesh after canonicalization plus the stage report.
#[derive(Clone, Debug)]
pub struct Canonical {
    pub mesh: Mesh,
    pub report: CanonReport,
}

/// A post-pose stage: takes the mesh, returns it transformed.
pub type Stage = fn(Mesh, &CanonCfg, &mut CanonReport) -> Result<Mesh, MeshError>;

/// Fixed stage order after pose selection.
pub const STAGES: [(&str, Stage); 5] = [
    ("user_flip", user_flip),
    ("align_planar", align_planar),
    ("enforce_landscape", enforce_landscape),
    ("top_width", disambiguate_top_width),
    ("level_base", level_base),
];

/// Run the full pipeline.
pub fn canonicalize(
    mut mesh: Mesh,
    cfg: &CanonCfg,
    poses: &dyn StablePoseSource,
) -> Result<Canonical, CanonError> {
    let mut report = CanonReport::default();
    match select_stable_pose(&mut mesh, poses) {
        Ok(pose) => report.pose_probability = Some(pose.probability),
        Err(PoseError::NoStablePose) => {
            tracing::warn!("no stable pose found; keeping original orientation");
            return Ok(Canonical { mesh, report });
        }
        Err(e) => return Err(e.into()),
    }
    for (name, stage) in STAGES {
        mesh = stage(mesh, cfg, &mut report)?;
        tracing::trace!(stage = name, "stage done");
    }
    tracing::info!(
        probability = report.pose_probability,
        align_deg = report.align_angle.to_degrees(),
        landscape_turned = report.landscape_turned,
        half_turned = report.half_turned,
        "mesh canonicalized"
    );
    Ok(Canonical { mesh, report })
}
