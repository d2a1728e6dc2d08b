//! Stable resting poses of a mesh.
//!
//! A stable pose is a rigid transform that sets the mesh down on one face of
//! its convex hull with the center of mass above that face, paired with the
//! probability that a randomly dropped part comes to rest there.
//!
//! Any routine can produce candidates through `StablePoseSource`; the default
//! `HullStablePoses` derives them from the convex hull and solid angles.
//! Selection is independent of the source: maximum probability, ties broken
//! by the order the source returned them.

mod hull;

use nalgebra::{Isometry3, Unit, Vector3};
use thiserror::Error;

use crate::mesh::{Mesh, MeshError};

pub use hull::{HullPoseCfg, HullStablePoses};

/// Errors raised while computing or applying stable poses.
#[derive(Debug, Error)]
pub enum PoseError {
    /// The source found no stable resting pose. Not fatal for callers that
    /// can keep the original orientation.
    #[error("no stable resting pose found")]
    NoStablePose,

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// One stable resting pose.
#[derive(Clone, Debug)]
pub struct PoseCandidate {
    /// Rigid transform that puts the mesh into this pose.
    pub transform: Isometry3<f64>,
    /// Likelihood of resting in this pose, in `[0, 1]`.
    pub probability: f64,
    /// Outward normal of the supporting face before the transform.
    pub normal: Unit<Vector3<f64>>,
}

/// Anything that can enumerate stable poses for a mesh.
pub trait StablePoseSource {
    fn stable_poses(&self, mesh: &Mesh) -> Result<Vec<PoseCandidate>, PoseError>;
}

impl<F> StablePoseSource for F
where
    F: Fn(&Mesh) -> Result<Vec<PoseCandidate>, PoseError>,
{
    fn stable_poses(&self, mesh: &Mesh) -> Result<Vec<PoseCandidate>, PoseError> {
        self(mesh)
    }
}

/// Highest-probability candidate; the first one wins ties.
pub fn select_best(candidates: &[PoseCandidate]) -> Option<&PoseCandidate> {
    candidates.iter().fold(None, |best: Option<&PoseCandidate>, c| match best {
        Some(b) if c.probability <= b.probability => Some(b),
        _ => Some(c),
    })
}

/// Put `mesh` into its most likely resting pose.
///
/// Returns the applied candidate, or `PoseError::NoStablePose` with the mesh
/// left untouched.
pub fn select_stable_pose(
    mesh: &mut Mesh,
    source: &dyn StablePoseSource,
) -> Result<PoseCandidate, PoseError> {
    mesh.validate()?;
    let candidates = source.stable_poses(mesh)?;
    let best = select_best(&candidates).ok_or(PoseError::NoStablePose)?.clone();
    tracing::debug!(
        candidates = candidates.len(),
        probability = best.probability,
        normal = ?best.normal.as_ref(),
        "stable pose selected"
    );
    mesh.apply_isometry(&best.transform);
    Ok(best)
}

#[cfg(test)]
mod tests;
