use nalgebra::Vector2;

use super::types::GeomCfg;

/// Andrew’s monotone chain convex hull, CCW, starting at the lowest-x point.
///
/// Non-finite points are ignored. Duplicates (within `cfg.eps_dedup`) and
/// collinear points are dropped, so no three consecutive hull points are
/// collinear. Fewer than three distinct, non-collinear inputs yield a hull
/// with fewer than three points; callers decide whether that is an error.
pub fn convex_hull(points: &[Vector2<f64>], cfg: GeomCfg) -> Vec<Vector2<f64>> {
    let mut pts: Vec<Vector2<f64>> = points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .copied()
        .collect();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| (*a - *b).norm() <= cfg.eps_dedup);
    if pts.len() < 3 {
        return pts;
    }
    let mut hull = half_chain(pts.iter());
    hull.extend(half_chain(pts.iter().rev()));
    // All-collinear input collapses to its two endpoints here.
    hull
}

/// One monotone half of the hull, without its final point (the first point
/// of the other half).
fn half_chain<'a>(sorted: impl Iterator<Item = &'a Vector2<f64>>) -> Vec<Vector2<f64>> {
    let mut chain: Vec<Vector2<f64>> = Vec::new();
    for &p in sorted {
        while let [.., a, b] = chain[..] {
            if turn(a, b, p) > 0.0 {
                break;
            }
            chain.pop();
        }
        chain.push(p);
    }
    chain.pop();
    chain
}

/// Twice the signed area of `(a, b, c)`; positive for a left turn.
#[inline]
fn turn(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let (ab, ac) = (b - a, c - a);
    ab.x * ac.y - ab.y * ac.x
}
