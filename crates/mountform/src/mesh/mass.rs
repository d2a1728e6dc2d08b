//! Mass properties for uniform-density closed meshes.
//!
//! Signed tetrahedra against the origin: each face `(a, b, c)` contributes
//! `a · (b × c) / 6` to the volume and that volume times `(a + b + c) / 4` to
//! the first moment. Open or inside-out meshes give garbage volumes; when the
//! volume is negligible relative to the bounding box we fall back to the
//! vertex mean so callers still get a usable balance point.

use nalgebra::{Point3, Vector3};

use super::Mesh;

/// Volume below this fraction of the bounding-box volume counts as flat.
const FLAT_VOLUME_FRAC: f64 = 1e-12;

impl Mesh {
    /// Signed enclosed volume (positive for outward-facing CCW faces).
    pub fn volume(&self) -> f64 {
        self.tetrahedra().map(|(v, _)| v).sum()
    }

    /// Center of mass of the enclosed solid, or the vertex mean when the
    /// enclosed volume is degenerate. `None` only for a mesh without vertices.
    pub fn center_of_mass(&self) -> Option<Point3<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let e = self.extents();
        let box_volume = e.x.max(f64::EPSILON) * e.y.max(f64::EPSILON) * e.z.max(f64::EPSILON);
        let (volume, moment) = self
            .tetrahedra()
            .fold((0.0, Vector3::zeros()), |(vol, mom), (v, c)| {
                (vol + v, mom + c * v)
            });
        if volume.abs() > FLAT_VOLUME_FRAC * box_volume && !self.faces.is_empty() {
            return Some(Point3::from(moment / volume));
        }
        Some(self.vertex_mean())
    }

    fn vertex_mean(&self) -> Point3<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// `(signed volume, centroid)` of each face's tetrahedron with the origin.
    fn tetrahedra(&self) -> impl Iterator<Item = (f64, Vector3<f64>)> + '_ {
        self.faces
            .iter()
            .filter(|tri| tri.iter().all(|&i| i < self.vertices.len()))
            .map(move |&[i, j, k]| {
                let a = self.vertices[i].coords;
                let b = self.vertices[j].coords;
                let c = self.vertices[k].coords;
                (a.dot(&b.cross(&c)) / 6.0, (a + b + c) / 4.0)
            })
    }
}
