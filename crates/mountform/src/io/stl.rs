//! STL triangle meshes via `stl_io`.
//!
//! Reading accepts binary and ASCII files and welds vertices that are
//! bit-identical (signed zeros count as equal). STL stores every triangle
//! corner separately, and the pose and mass code want shared vertices.
//! Stored normals are ignored. Writing produces binary STL with normals
//! recomputed from the winding.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use stl_io::{Normal, Triangle, Vertex};

use super::IoResult;
use crate::mesh::Mesh;

/// Read an STL stream into an indexed mesh.
pub fn read_mesh<R: Read + Seek>(reader: &mut R) -> IoResult<Mesh> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    let mut index: HashMap<[u32; 3], usize> = HashMap::new();
    for tri in stl_io::create_stl_reader(reader)? {
        let tri = tri?;
        let mut face = [0usize; 3];
        for (slot, v) in face.iter_mut().zip(tri.vertices.iter()) {
            let key = [weld_key(v[0]), weld_key(v[1]), weld_key(v[2])];
            *slot = *index.entry(key).or_insert_with(|| {
                vertices.push(Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])));
                vertices.len() - 1
            });
        }
        faces.push(face);
    }
    tracing::debug!(vertices = vertices.len(), faces = faces.len(), "read stl");
    Ok(Mesh::new(vertices, faces))
}

/// Bit pattern used for welding; `-0.0` and `0.0` share one.
#[inline]
fn weld_key(x: f32) -> u32 {
    if x == 0.0 {
        0
    } else {
        x.to_bits()
    }
}

/// Write `mesh` as binary STL.
pub fn write_mesh<W: Write>(writer: &mut W, mesh: &Mesh) -> IoResult<()> {
    mesh.validate()?;
    let triangles: Vec<Triangle> = mesh
        .faces
        .iter()
        .map(|f| {
            let [a, b, c] = f.map(|i| mesh.vertices[i]);
            let n = (b - a)
                .cross(&(c - a))
                .try_normalize(0.0)
                .unwrap_or_else(Vector3::zeros);
            Triangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [a, b, c].map(|p| Vertex::new([p.x as f32, p.y as f32, p.z as f32])),
            }
        })
        .collect();
    stl_io::write_stl(writer, triangles.iter())?;
    Ok(())
}

/// Open and read an STL file.
pub fn load(path: &Path) -> IoResult<Mesh> {
    let mut reader = BufReader::new(File::open(path)?);
    read_mesh(&mut reader)
}

/// Create (or truncate) `path` and write `mesh` to it.
pub fn save(path: &Path, mesh: &Mesh) -> IoResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_mesh(&mut writer, mesh)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), faces = mesh.faces.len(), "wrote stl");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::IoError;
    use crate::mesh::special;
    use std::io::Cursor;

    #[test]
    fn binary_write_then_read_welds_vertices() {
        let cube = special::cuboid(2.0, 4.0, 1.0);
        let mut buf = Cursor::new(Vec::new());
        write_mesh(&mut buf, &cube).unwrap();
        // 80-byte header, count, 50 bytes per facet.
        assert_eq!(buf.get_ref().len(), 84 + 50 * cube.faces.len());

        buf.set_position(0);
        let back = read_mesh(&mut buf).unwrap();
        assert_eq!(back.faces.len(), 12);
        assert_eq!(back.vertices.len(), 8);
        assert!((back.volume() - 8.0).abs() < 1e-5);
        assert!((back.extents() - Vector3::new(2.0, 4.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn reads_ascii() {
        let text = "solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid tri
";
        let mesh = read_mesh(&mut Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertices[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn signed_zero_corners_are_welded() {
        let text = "solid pair
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 0 1 0
  endloop
endfacet
facet normal 0 0 1
  outer loop
    vertex -0 -0 0
    vertex 0 -1 0
    vertex 1 -0 -0
  endloop
endfacet
endsolid pair
";
        let mesh = read_mesh(&mut Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 3, 1]]);
    }

    #[test]
    fn invalid_mesh_is_not_written() {
        let bad = Mesh::new(vec![Point3::origin()], vec![[0, 1, 2]]);
        let mut buf = Cursor::new(Vec::new());
        assert!(matches!(write_mesh(&mut buf, &bad), Err(IoError::Mesh(_))));
        assert!(buf.get_ref().is_empty());
    }

    #[test]
    fn truncated_file_is_an_error() {
        let mut short = Cursor::new(vec![0u8; 40]);
        assert!(read_mesh(&mut short).is_err());
    }
}
