use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Vector3;

use super::{CanonCfg, CanonReport, WiderEnd};
use crate::geom2::{convex_hull, min_area_rect_of_hull, quarter_turn_residual};
use crate::mesh::{Mesh, MeshError};

/// Turn the part upside down (180° about X) when `cfg.flip` is set.
///
/// For parts whose most stable face is the wrong one to print against. Runs
/// before planar alignment so alignment sees the corrected up axis.
pub fn user_flip(
    mut mesh: Mesh,
    cfg: &CanonCfg,
    report: &mut CanonReport,
) -> Result<Mesh, MeshError> {
    if cfg.flip {
        tracing::info!("flipping 180° about X (user override)");
        mesh.rotate_x(PI);
        report.flipped = true;
    }
    Ok(mesh)
}

/// Rotate about Z so the minimum-area rectangle of the XY hull is axis-aligned.
///
/// The winning hull-edge angle is reduced modulo a quarter turn before use;
/// the leftover quarter/half turn is settled by the landscape and top-width
/// stages. A second run therefore rotates by zero.
pub fn align_planar(
    mut mesh: Mesh,
    cfg: &CanonCfg,
    report: &mut CanonReport,
) -> Result<Mesh, MeshError> {
    let hull = convex_hull(&mesh.planar_points(), cfg.geom);
    let rect = min_area_rect_of_hull(&hull, cfg.geom)
        .ok_or(MeshError::DegenerateHull { points: hull.len() })?;
    let angle = quarter_turn_residual(rect.angle);
    tracing::debug!(
        hull = hull.len(),
        edge = rect.edge,
        area = rect.area,
        angle_deg = angle.to_degrees(),
        "minimum-area rectangle"
    );
    mesh.rotate_z(-angle);
    report.align_angle = -angle;
    report.min_rect_area = rect.area;
    Ok(mesh)
}

/// Rotate 90° about Z if the part is taller (Y) than wide (X).
pub fn enforce_landscape(
    mut mesh: Mesh,
    cfg: &CanonCfg,
    report: &mut CanonReport,
) -> Result<Mesh, MeshError> {
    let e = mesh.extents();
    if exceeds(e.y, e.x, cfg.tie_eps) {
        tracing::debug!(x = e.x, y = e.y, "rotating 90° for landscape");
        mesh.rotate_z(FRAC_PI_2);
        report.landscape_turned = true;
    }
    Ok(mesh)
}

/// X-extent of the vertices in the top slice (`y > max_y − tol`) and bottom
/// slice (`y < min_y + tol`), `tol = fraction × (max_y − min_y)`. Empty
/// slices have width 0.
pub fn slice_widths(mesh: &Mesh, fraction: f64) -> (f64, f64) {
    let Some((lo, hi)) = mesh.bounds() else {
        return (0.0, 0.0);
    };
    let tol = (hi.y - lo.y) * fraction;
    let width = |keep: &dyn Fn(f64) -> bool| {
        let (min_x, max_x) = mesh
            .vertices
            .iter()
            .filter(|p| keep(p.y))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), p| {
                (a.min(p.x), b.max(p.x))
            });
        if min_x <= max_x {
            max_x - min_x
        } else {
            0.0
        }
    };
    let top = width(&|y| y > hi.y - tol);
    let bottom = width(&|y| y < lo.y + tol);
    (top, bottom)
}

/// Settle the 180° ambiguity: put the wider Y end where `cfg.wider_end` says.
///
/// Heuristic for one object class (the physically wider end belongs at the
/// top of the printed page); near-symmetric parts can go either way.
pub fn disambiguate_top_width(
    mut mesh: Mesh,
    cfg: &CanonCfg,
    report: &mut CanonReport,
) -> Result<Mesh, MeshError> {
    let (top, bottom) = slice_widths(&mesh, cfg.slice_fraction);
    report.top_width = top;
    report.bottom_width = bottom;
    let turn = match cfg.wider_end {
        WiderEnd::Top => exceeds(bottom, top, cfg.tie_eps),
        WiderEnd::Bottom => exceeds(top, bottom, cfg.tie_eps),
    };
    tracing::debug!(top, bottom, turn, "slice widths");
    if turn {
        mesh.rotate_z(PI);
        report.half_turned = true;
    }
    Ok(mesh)
}

/// Translate along Z so the lowest vertex sits at `z = 0`.
pub fn level_base(
    mut mesh: Mesh,
    cfg: &CanonCfg,
    report: &mut CanonReport,
) -> Result<Mesh, MeshError> {
    let (lo, _) = mesh.bounds().ok_or(MeshError::EmptyMesh)?;
    if lo.z.abs() > cfg.level_eps {
        mesh.translate(Vector3::new(0.0, 0.0, -lo.z));
        report.base_shift = -lo.z;
    }
    Ok(mesh)
}

/// `a > b` by more than `eps` relative to the larger magnitude.
#[inline]
fn exceeds(a: f64, b: f64, eps: f64) -> bool {
    a > b + eps * a.abs().max(b.abs())
}
