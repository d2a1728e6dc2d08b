//! Geometry core for mounting templates.
//!
//! Two independent pipelines, each a fixed chain of stages that take and
//! return the same geometry value:
//! - `canon`: puts a triangulated mesh into a canonical resting pose (stable
//!   face down, landscape, wider end at +Y, base at z = 0).
//! - `contour`: turns a traced closed outline into a left/right symmetric
//!   profile.
//!
//! Supporting modules
//! - `geom2`: planar convex hull and minimum-area rectangle (rotating calipers).
//! - `mesh`: indexed triangle mesh, rigid transforms, mass properties.
//! - `pose`: stable resting poses of a mesh.
//! - `io`: STL and SVG path adapters.

pub mod canon;
pub mod contour;
pub mod geom2;
pub mod io;
pub mod mesh;
pub mod pose;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use geom2::GeomCfg;
pub use nalgebra::{Point3, Vector2, Vector3};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::canon::{canonicalize, CanonCfg, CanonError, CanonReport, Canonical, WiderEnd};
    pub use crate::contour::{
        calibrate, simplify_closed, symmetrize, to_units, Contour, ContourError, Reference,
        SymmetrizeCfg, Symmetrized,
    };
    pub use crate::geom2::{convex_hull, min_area_rect, GeomCfg, MinAreaRect};
    pub use crate::mesh::{Mesh, MeshError};
    pub use crate::pose::{HullPoseCfg, HullStablePoses, PoseCandidate, PoseError, StablePoseSource};
    pub use nalgebra::{Point3, Vector2, Vector3};
}
