//! Indexed triangle meshes and rigid transforms.
//!
//! Conventions
//! - `+Z` is up; the print bed is the plane `z = 0`.
//! - Faces are index triples into `vertices`, counter-clockwise seen from
//!   outside. Pose computation assumes a closed, positively oriented solid but
//!   nothing here enforces manifoldness.
//! - Pipeline stages only ever move every vertex by the same rigid transform;
//!   vertex and face counts never change.

mod mass;
pub mod special;

use nalgebra::{Isometry3, Point3, Rotation3, Vector2, Vector3};
use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised by mesh validation and alignment.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The mesh has no vertices or no faces.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {len} vertices")]
    FaceIndexOutOfBounds { face: usize, index: usize, len: usize },

    /// The horizontal projection spans fewer than three hull points.
    #[error("planar projection is degenerate ({points} hull points, need at least 3)")]
    DegenerateHull { points: usize },
}

/// Triangle mesh: vertex positions plus index triples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    #[inline]
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Check that the mesh is non-empty and every face index is in range.
    pub fn validate(&self) -> MeshResult<()> {
        if self.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        let len = self.vertices.len();
        for (face, tri) in self.faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= len) {
                return Err(MeshError::FaceIndexOutOfBounds { face, index, len });
            }
        }
        Ok(())
    }

    /// Axis-aligned bounds `(min, max)`, `None` for a mesh without vertices.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        }))
    }

    /// Size of the bounding box along each axis (zero for an empty mesh).
    pub fn extents(&self) -> Vector3<f64> {
        self.bounds()
            .map(|(lo, hi)| hi - lo)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Vertex positions projected onto the XY plane.
    pub fn planar_points(&self) -> Vec<Vector2<f64>> {
        self.vertices.iter().map(|p| Vector2::new(p.x, p.y)).collect()
    }

    pub fn apply_isometry(&mut self, iso: &Isometry3<f64>) {
        for p in &mut self.vertices {
            *p = iso * *p;
        }
    }

    /// Rotate every vertex by `angle` (radians, CCW seen from +Z) about the Z
    /// axis through the origin.
    pub fn rotate_z(&mut self, angle: f64) {
        self.rotate(Rotation3::from_axis_angle(&Vector3::z_axis(), angle));
    }

    /// Rotate every vertex by `angle` about the X axis through the origin.
    pub fn rotate_x(&mut self, angle: f64) {
        self.rotate(Rotation3::from_axis_angle(&Vector3::x_axis(), angle));
    }

    pub fn translate(&mut self, t: Vector3<f64>) {
        for p in &mut self.vertices {
            *p += t;
        }
    }

    fn rotate(&mut self, rot: Rotation3<f64>) {
        for p in &mut self.vertices {
            *p = rot * *p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn validate_reports_bad_index() {
        let mesh = Mesh::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2], [0, 2, 7]],
        );
        match mesh.validate() {
            Err(MeshError::FaceIndexOutOfBounds { face, index, len }) => {
                assert_eq!((face, index, len), (1, 7, 3));
            }
            other => panic!("expected out-of-bounds error, got {other:?}"),
        }
        assert!(matches!(Mesh::default().validate(), Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn extents_and_bounds_follow_rotation() {
        let mut mesh = special::cuboid(4.0, 2.0, 1.0);
        let e = mesh.extents();
        assert!((e - Vector3::new(4.0, 2.0, 1.0)).norm() < 1e-12);
        mesh.rotate_z(FRAC_PI_2);
        let e = mesh.extents();
        assert!((e - Vector3::new(2.0, 4.0, 1.0)).norm() < 1e-12);
        mesh.rotate_x(PI);
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo.z + 0.5).abs() < 1e-12 && (hi.z - 0.5).abs() < 1e-12);
        mesh.translate(Vector3::new(0.0, 0.0, 0.5));
        assert!(mesh.bounds().unwrap().0.z.abs() < 1e-12);
    }

    #[test]
    fn empty_mesh_has_zero_extents() {
        assert_eq!(Mesh::default().extents(), Vector3::zeros());
        assert!(Mesh::default().bounds().is_none());
    }
}
