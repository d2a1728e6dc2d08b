use super::*;
use crate::mesh::special;
use nalgebra::{Point3, Translation3, UnitQuaternion, Vector2, Vector3};

fn candidate(probability: f64, nz: f64) -> PoseCandidate {
    PoseCandidate {
        transform: Isometry3::from_parts(
            Translation3::new(0.0, 0.0, probability),
            UnitQuaternion::identity(),
        ),
        probability,
        normal: Unit::new_normalize(Vector3::new(0.0, 0.0, nz)),
    }
}

#[test]
fn select_best_prefers_first_on_ties() {
    let cands = vec![candidate(0.2, -1.0), candidate(0.4, 1.0), candidate(0.4, -1.0)];
    let best = select_best(&cands).unwrap();
    assert_eq!(best.probability, 0.4);
    assert!(best.normal.z > 0.0);
    assert!(select_best(&[]).is_none());
}

#[test]
fn no_candidates_leaves_mesh_untouched() {
    let mut mesh = special::cuboid(1.0, 2.0, 3.0);
    let before = mesh.clone();
    let none = |_: &Mesh| -> Result<Vec<PoseCandidate>, PoseError> { Ok(Vec::new()) };
    assert!(matches!(
        select_stable_pose(&mut mesh, &none),
        Err(PoseError::NoStablePose)
    ));
    assert_eq!(mesh, before);
}

#[test]
fn hull_poses_of_box_sum_to_one_and_favor_large_faces() {
    let mesh = special::cuboid(2.0, 4.0, 1.0);
    let cands = HullStablePoses::default().stable_poses(&mesh).unwrap();
    assert_eq!(cands.len(), 6);
    let total: f64 = cands.iter().map(|c| c.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);
    let best = select_best(&cands).unwrap();
    assert!(best.normal.z.abs() > 1.0 - 1e-9, "normal = {:?}", best.normal);
    assert!(best.probability > 0.25);
}

#[test]
fn selected_pose_rests_on_facet_with_center_above_origin() {
    let mut mesh = special::cuboid(2.0, 4.0, 1.0);
    mesh.apply_isometry(&Isometry3::new(
        Vector3::new(3.0, -1.0, 7.0),
        Vector3::new(0.4, 1.1, -0.3),
    ));
    let pose = select_stable_pose(&mut mesh, &HullStablePoses::default()).unwrap();
    assert!(pose.probability > 0.25);
    let (lo, _) = mesh.bounds().unwrap();
    assert!(lo.z.abs() < 1e-9);
    assert!((mesh.extents().z - 1.0).abs() < 1e-9);
    let c = mesh.center_of_mass().unwrap();
    assert!(c.x.abs() < 1e-9 && c.y.abs() < 1e-9);
}

#[test]
fn heavy_side_becomes_the_base() {
    // Unit cube ballasted toward -X: that face subtends the largest solid angle.
    let mesh = special::cuboid(1.0, 1.0, 1.0);
    let source = HullStablePoses::new(HullPoseCfg {
        center_of_mass: Some(Point3::new(-0.35, 0.0, 0.0)),
        ..HullPoseCfg::default()
    });
    let mut posed = mesh.clone();
    let pose = select_stable_pose(&mut posed, &source).unwrap();
    assert!((pose.normal.x + 1.0).abs() < 1e-9);
    // Every vertex that was on the -X face now sits on the bed.
    for (before, after) in mesh.vertices.iter().zip(&posed.vertices) {
        if (before.x + 0.5).abs() < 1e-12 {
            assert!(after.z.abs() < 1e-9);
        } else {
            assert!((after.z - 1.0).abs() < 1e-9);
        }
    }
}

#[test]
fn unstable_face_is_not_a_candidate() {
    // Obtuse triangular prism: the short slanted side cannot hold the part.
    let outline = [
        Vector2::new(0.0, 0.0),
        Vector2::new(4.0, 0.0),
        Vector2::new(5.0, 1.0),
    ];
    let mesh = special::prism(&outline, 1.0);
    let cands = HullStablePoses::default().stable_poses(&mesh).unwrap();
    let slanted = Vector3::new(1.0, -1.0, 0.0).normalize();
    assert!(!cands.is_empty());
    assert!(cands.iter().all(|c| c.normal.dot(&slanted) < 1.0 - 1e-6));
    let total: f64 = cands.iter().map(|c| c.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(cands.iter().all(|c| (0.0..=1.0).contains(&c.probability)));
}

#[test]
fn flat_mesh_has_no_stable_pose() {
    let mesh = Mesh::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    );
    let cands = HullStablePoses::default().stable_poses(&mesh).unwrap();
    assert!(cands.is_empty());
}
