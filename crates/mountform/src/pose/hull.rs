//! Stable poses from the convex hull (quasi-static drop model).
//!
//! Model
//! - A part rests on a face of its convex hull. Coplanar hull triangles are
//!   merged into one facet.
//! - A facet is stable iff the center of mass, projected along the facet
//!   normal, lands inside the facet.
//! - A dropped part initially lands on each facet with probability equal to the
//!   solid angle the facet subtends at the center of mass, divided by the
//!   total. An unstable facet tips over the boundary edge its projected
//!   center lies furthest beyond and hands its probability to the facet on the
//!   other side, repeated until a stable facet absorbs it. Mass caught in a
//!   tipping cycle is dropped; stable probabilities are renormalized.
//!
//! The transform for a facet rotates its outward normal onto −Z, puts the
//! facet plane at `z = 0`, and moves the center of mass over the origin.

use std::collections::HashMap;
use std::f64::consts::PI;

use chull::ConvexHullWrapper;
use nalgebra::{Isometry3, Point3, Translation3, Unit, UnitQuaternion, Vector3};

use super::{PoseCandidate, PoseError, StablePoseSource};
use crate::mesh::{Mesh, MeshError};

/// Configuration for `HullStablePoses`.
#[derive(Clone, Copy, Debug)]
pub struct HullPoseCfg {
    /// Override for the center of mass (non-uniform density, inserts, ...).
    pub center_of_mass: Option<Point3<f64>>,
    /// Hull triangles whose unit normals differ by less than this (1 − cos)
    /// belong to the same facet.
    pub coplanar_eps: f64,
    /// Slack, relative to the hull size, when testing whether the projected
    /// center lies inside a facet.
    pub inside_eps: f64,
}

impl Default for HullPoseCfg {
    fn default() -> Self {
        Self {
            center_of_mass: None,
            coplanar_eps: 1e-6,
            inside_eps: 1e-9,
        }
    }
}

/// Stable poses computed from the mesh's own convex hull.
#[derive(Clone, Copy, Debug, Default)]
pub struct HullStablePoses {
    pub cfg: HullPoseCfg,
}

impl HullStablePoses {
    pub fn new(cfg: HullPoseCfg) -> Self {
        Self { cfg }
    }
}

impl StablePoseSource for HullStablePoses {
    fn stable_poses(&self, mesh: &Mesh) -> Result<Vec<PoseCandidate>, PoseError> {
        mesh.validate()?;
        let com = match self.cfg.center_of_mass {
            Some(c) => c,
            None => mesh.center_of_mass().ok_or(MeshError::EmptyMesh)?,
        };
        let Some(hull) = Hull::build(&mesh.vertices) else {
            tracing::warn!("convex hull is degenerate (flat or collinear mesh)");
            return Ok(Vec::new());
        };
        Ok(hull.stable_poses(com, &self.cfg))
    }
}

#[derive(Clone, Copy, Debug)]
struct HullTri {
    v: [usize; 3],
    normal: Unit<Vector3<f64>>,
}

#[derive(Clone, Debug)]
struct Facet {
    normal: Unit<Vector3<f64>>,
    offset: f64,
    tris: Vec<usize>,
}

struct Hull {
    points: Vec<Point3<f64>>,
    tris: Vec<HullTri>,
    /// Length scale (bounding-box diagonal) for relative tolerances.
    scale: f64,
}

impl Hull {
    fn build(vertices: &[Point3<f64>]) -> Option<Self> {
        if !spans_volume(vertices) {
            return None;
        }
        let input: Vec<Vec<f64>> = vertices.iter().map(|p| vec![p.x, p.y, p.z]).collect();
        let hull = ConvexHullWrapper::try_new(&input, None).ok()?;
        let (verts, indices) = hull.vertices_indices();
        let points: Vec<Point3<f64>> = verts
            .iter()
            .map(|v| Point3::new(v[0], v[1], v[2]))
            .collect();
        if points.len() < 4 {
            return None;
        }
        let interior = Point3::from(
            points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / points.len() as f64,
        );
        let (lo, hi) = points.iter().fold((points[0], points[0]), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        });
        let scale = (hi - lo).norm();
        let mut tris = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            let mut v = [tri[0], tri[1], tri[2]];
            let (a, b, c) = (points[v[0]], points[v[1]], points[v[2]]);
            let mut n = (b - a).cross(&(c - a));
            if n.norm() <= f64::EPSILON * scale * scale {
                continue;
            }
            // Wind outward regardless of the hull library's convention.
            if n.dot(&(a - interior)) < 0.0 {
                v.swap(1, 2);
                n = -n;
            }
            tris.push(HullTri {
                v,
                normal: Unit::new_normalize(n),
            });
        }
        if tris.len() < 4 {
            return None;
        }
        Some(Self {
            points,
            tris,
            scale,
        })
    }

    fn facets(&self, coplanar_eps: f64) -> (Vec<Facet>, Vec<usize>) {
        let mut facets: Vec<Facet> = Vec::new();
        let mut owner = Vec::with_capacity(self.tris.len());
        for (t, tri) in self.tris.iter().enumerate() {
            let offset = tri.normal.dot(&self.points[tri.v[0]].coords);
            let found = facets.iter().position(|f| {
                1.0 - f.normal.dot(tri.normal.as_ref()) < coplanar_eps
                    && (f.offset - offset).abs() <= coplanar_eps * self.scale
            });
            match found {
                Some(f) => {
                    facets[f].tris.push(t);
                    owner.push(f);
                }
                None => {
                    owner.push(facets.len());
                    facets.push(Facet {
                        normal: tri.normal,
                        offset,
                        tris: vec![t],
                    });
                }
            }
        }
        (facets, owner)
    }

    fn stable_poses(&self, com: Point3<f64>, cfg: &HullPoseCfg) -> Vec<PoseCandidate> {
        let (facets, owner) = self.facets(cfg.coplanar_eps);

        // Directed hull edge (a, b) → triangle that owns it.
        let mut edge_tri: HashMap<(usize, usize), usize> = HashMap::new();
        for (t, tri) in self.tris.iter().enumerate() {
            for k in 0..3 {
                edge_tri.insert((tri.v[k], tri.v[(k + 1) % 3]), t);
            }
        }

        let inside_tol = cfg.inside_eps * self.scale * self.scale;
        let mut landing = vec![0.0; facets.len()];
        let mut rest = vec![Rest::Stable; facets.len()];
        for (f, facet) in facets.iter().enumerate() {
            landing[f] = facet
                .tris
                .iter()
                .map(|&t| self.solid_angle(t, com))
                .sum::<f64>();
            let height = facet.normal.dot(&com.coords) - facet.offset;
            let projected = com - facet.normal.into_inner() * height;
            let inside = facet
                .tris
                .iter()
                .any(|&t| {
                    self.edge_margins(t, projected)
                        .iter()
                        .all(|&m| m >= -inside_tol)
                });
            if !inside {
                rest[f] = match self.tipping_neighbor(f, facet, projected, &owner, &edge_tri) {
                    Some(g) => Rest::Tips(g),
                    None => Rest::Lost,
                };
            }
        }

        let total_angle: f64 = landing.iter().sum();
        if total_angle <= 0.0 {
            return Vec::new();
        }
        let mut absorbed = vec![0.0; facets.len()];
        for (f, &mass) in landing.iter().enumerate() {
            if let Some(target) = settle(f, &rest) {
                absorbed[target] += mass / total_angle;
            }
        }
        let kept: f64 = absorbed.iter().sum();
        if kept <= 0.0 {
            return Vec::new();
        }

        let stable: Vec<usize> = (0..facets.len())
            .filter(|&f| rest[f] == Rest::Stable)
            .collect();
        tracing::debug!(
            facets = facets.len(),
            stable = stable.len(),
            solid_angle = total_angle / (4.0 * PI),
            "hull facets classified"
        );
        stable
            .into_iter()
            .map(|f| PoseCandidate {
                transform: rest_transform(&facets[f], com),
                probability: (absorbed[f] / kept).clamp(0.0, 1.0),
                normal: facets[f].normal,
            })
            .collect()
    }

    /// Signed distances (scaled by edge length) of `p` from each edge of
    /// triangle `t`; all non-negative means inside.
    fn edge_margins(&self, t: usize, p: Point3<f64>) -> [f64; 3] {
        let tri = &self.tris[t];
        let mut m = [0.0; 3];
        for k in 0..3 {
            let a = self.points[tri.v[k]];
            let b = self.points[tri.v[(k + 1) % 3]];
            m[k] = (b - a).cross(&(p - a)).dot(tri.normal.as_ref());
        }
        m
    }

    /// Facet reached by tipping `facet` over the boundary edge that the
    /// projected center lies furthest beyond.
    fn tipping_neighbor(
        &self,
        f: usize,
        facet: &Facet,
        projected: Point3<f64>,
        owner: &[usize],
        edge_tri: &HashMap<(usize, usize), usize>,
    ) -> Option<usize> {
        let mut best: Option<(f64, usize)> = None;
        for &t in &facet.tris {
            let tri = &self.tris[t];
            for k in 0..3 {
                let (a, b) = (tri.v[k], tri.v[(k + 1) % 3]);
                let Some(&across) = edge_tri.get(&(b, a)) else {
                    continue;
                };
                let g = owner[across];
                if g == f {
                    continue;
                }
                let (pa, pb) = (self.points[a], self.points[b]);
                let len = (pb - pa).norm();
                if len <= 0.0 {
                    continue;
                }
                let margin = (pb - pa).cross(&(projected - pa)).dot(facet.normal.as_ref()) / len;
                if best.map_or(true, |(m, _)| margin < m) {
                    best = Some((margin, g));
                }
            }
        }
        best.map(|(_, g)| g)
    }

    /// Solid angle of hull triangle `t` seen from `from` (Van Oosterom–Strackee).
    fn solid_angle(&self, t: usize, from: Point3<f64>) -> f64 {
        let tri = &self.tris[t];
        let r1 = self.points[tri.v[0]] - from;
        let r2 = self.points[tri.v[1]] - from;
        let r3 = self.points[tri.v[2]] - from;
        let (l1, l2, l3) = (r1.norm(), r2.norm(), r3.norm());
        let num = r1.dot(&r2.cross(&r3));
        let den = l1 * l2 * l3 + r1.dot(&r2) * l3 + r1.dot(&r3) * l2 + r2.dot(&r3) * l1;
        (2.0 * num.atan2(den)).abs()
    }
}

/// False if all points lie (numerically) on one plane, line or point.
fn spans_volume(points: &[Point3<f64>]) -> bool {
    let Some(&p0) = points.first() else {
        return false;
    };
    let farthest = |score: &dyn Fn(&Point3<f64>) -> f64| {
        points
            .iter()
            .copied()
            .map(|p| (score(&p), p))
            .fold((0.0, p0), |best, cur| if cur.0 > best.0 { cur } else { best })
    };
    let (d1, p1) = farthest(&|p| (p - p0).norm());
    if d1 <= f64::EPSILON {
        return false;
    }
    let axis = (p1 - p0) / d1;
    let (d2, p2) = farthest(&|p| (p - p0).cross(&axis).norm());
    if d2 <= 1e-9 * d1 {
        return false;
    }
    let normal = (p1 - p0).cross(&(p2 - p0)).normalize();
    let (d3, _) = farthest(&|p| normal.dot(&(p - p0)).abs());
    d3 > 1e-9 * d1
}

/// Where a part that lands on a facet ends up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rest {
    Stable,
    Tips(usize),
    /// Unstable with no neighbor to tip onto (open hull edge).
    Lost,
}

/// Follow tipping links from `f` to the facet that finally holds the part.
fn settle(f: usize, rest: &[Rest]) -> Option<usize> {
    let mut current = f;
    for _ in 0..=rest.len() {
        match rest[current] {
            Rest::Stable => return Some(current),
            Rest::Tips(next) => current = next,
            Rest::Lost => return None,
        }
    }
    None
}

fn rest_transform(facet: &Facet, com: Point3<f64>) -> Isometry3<f64> {
    let down = Unit::new_unchecked(Vector3::new(0.0, 0.0, -1.0));
    let rot = UnitQuaternion::rotation_between_axis(&facet.normal, &down)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI));
    let c = rot * com;
    Isometry3::from_parts(Translation3::new(-c.x, -c.y, facet.offset), rot)
}
