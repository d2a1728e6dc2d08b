//! Constructors for simple closed meshes (fixtures, benches, calibration parts).

use nalgebra::{Point3, Vector2, Vector3};

use super::Mesh;

/// Extrude a convex CCW outline from `z = 0` to `z = height`.
pub fn prism(outline: &[Vector2<f64>], height: f64) -> Mesh {
    loft(outline, outline, height)
}

/// Join convex CCW `floor` (at `z = 0`) and `roof` (at `z = height`) outlines
/// with the same vertex count.
///
/// Vertex `i` is `floor[i]`, vertex `n + i` is `roof[i]`. Faces wind outward.
pub fn loft(floor: &[Vector2<f64>], roof: &[Vector2<f64>], height: f64) -> Mesh {
    let n = floor.len().min(roof.len());
    let mut vertices = Vec::with_capacity(2 * n);
    vertices.extend(floor[..n].iter().map(|p| Point3::new(p.x, p.y, 0.0)));
    vertices.extend(roof[..n].iter().map(|p| Point3::new(p.x, p.y, height)));
    let mut faces = Vec::with_capacity(4 * n);
    for i in 1..n.saturating_sub(1) {
        faces.push([0, i + 1, i]);
        faces.push([n, n + i, n + i + 1]);
    }
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push([i, j, n + j]);
        faces.push([i, n + j, n + i]);
    }
    Mesh::new(vertices, faces)
}

/// Rectangular frustum: a `bottom.x × bottom.y` base at `z = 0` under a
/// `top.x × top.y` roof at `z = height`, both centered on the Z axis.
pub fn frustum(bottom: Vector2<f64>, top: Vector2<f64>, height: f64) -> Mesh {
    let rect = |size: Vector2<f64>| {
        let h = size / 2.0;
        [
            Vector2::new(-h.x, -h.y),
            Vector2::new(h.x, -h.y),
            Vector2::new(h.x, h.y),
            Vector2::new(-h.x, h.y),
        ]
    };
    loft(&rect(bottom), &rect(top), height)
}

/// Axis-aligned box with the given side lengths, centered at the origin.
pub fn cuboid(sx: f64, sy: f64, sz: f64) -> Mesh {
    let (hx, hy) = (sx / 2.0, sy / 2.0);
    let outline = [
        Vector2::new(-hx, -hy),
        Vector2::new(hx, -hy),
        Vector2::new(hx, hy),
        Vector2::new(-hx, hy),
    ];
    let mut mesh = prism(&outline, sz);
    mesh.translate(Vector3::new(0.0, 0.0, -sz / 2.0));
    mesh
}

/// Isosceles trapezoid slab in the XY plane: `bottom_width` at `y = 0`,
/// `top_width` at `y = depth`, extruded to `height`.
pub fn trapezoid_slab(bottom_width: f64, top_width: f64, depth: f64, height: f64) -> Mesh {
    let (b, t) = (bottom_width / 2.0, top_width / 2.0);
    let outline = [
        Vector2::new(-b, 0.0),
        Vector2::new(b, 0.0),
        Vector2::new(t, depth),
        Vector2::new(-t, depth),
    ];
    prism(&outline, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prism_counts_and_volume() {
        let mesh = trapezoid_slab(4.0, 2.0, 2.0, 1.0);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.faces.len(), 12);
        mesh.validate().unwrap();
        assert!((mesh.volume() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn frustum_volume() {
        // Prismatoid rule: h/6 (A0 + 4 Am + A1).
        let mesh = frustum(Vector2::new(6.0, 4.0), Vector2::new(2.0, 1.0), 1.0);
        mesh.validate().unwrap();
        let expected = (24.0 + 4.0 * 4.0 * 2.5 + 2.0) / 6.0;
        assert!((mesh.volume() - expected).abs() < 1e-12);
    }

    #[test]
    fn cuboid_is_centered() {
        let mesh = cuboid(1.0, 2.0, 3.0);
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo.coords + hi.coords).norm() < 1e-12);
        assert!(mesh.volume() > 0.0);
    }
}
