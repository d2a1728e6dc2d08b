//! Douglas–Peucker simplification of closed rings.

use nalgebra::Vector2;

use super::Contour;

/// `frac × perimeter`, the usual tolerance for traced outlines (0.001).
pub fn relative_epsilon(contour: &Contour, frac: f64) -> f64 {
    frac * contour.perimeter()
}

/// Drop vertices that lie within `epsilon` of the simplified outline.
///
/// The ring is split at the first point and the point farthest from it; each
/// half is simplified as an open chain with fixed endpoints. A result with
/// fewer than three points is rejected and the input returned unchanged.
pub fn simplify_closed(contour: &Contour, epsilon: f64) -> Contour {
    let pts = &contour.points;
    let n = pts.len();
    if n <= 3 || epsilon.is_nan() || epsilon <= 0.0 {
        return contour.clone();
    }
    let far = (1..n)
        .max_by(|&i, &j| {
            let (di, dj) = ((pts[i] - pts[0]).norm_squared(), (pts[j] - pts[0]).norm_squared());
            di.total_cmp(&dj)
        })
        .unwrap_or(1);

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[far] = true;
    mark_chain(pts, &(0..=far).collect::<Vec<_>>(), epsilon, &mut keep);
    let back: Vec<usize> = (far..n).chain(std::iter::once(0)).collect();
    mark_chain(pts, &back, epsilon, &mut keep);

    let points: Vec<Vector2<f64>> = pts
        .iter()
        .zip(&keep)
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect();
    if points.len() < 3 {
        return contour.clone();
    }
    tracing::debug!(before = n, after = points.len(), epsilon, "contour simplified");
    Contour { points }
}

/// Mark the vertices of the open chain `idx` that survive simplification.
fn mark_chain(pts: &[Vector2<f64>], idx: &[usize], epsilon: f64, keep: &mut [bool]) {
    let mut stack = vec![(0usize, idx.len() - 1)];
    while let Some((s, e)) = stack.pop() {
        if e <= s + 1 {
            continue;
        }
        let (a, b) = (pts[idx[s]], pts[idx[e]]);
        let (k, d) = (s + 1..e)
            .map(|k| (k, segment_distance(pts[idx[k]], a, b)))
            .fold((s, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if d > epsilon {
            keep[idx[k]] = true;
            stack.push((s, k));
            stack.push((k, e));
        }
    }
}

fn segment_distance(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}
