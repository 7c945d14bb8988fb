use approx::assert_relative_eq;
use nalgebra::{Point3, Rotation3, Vector3};
use proptest::prelude::*;
use rig_align::{compute_alignment, PointSet, RigidAligner};

/// Anclas no coplanares: garantizan covarianza de rango completo.
const ANCHORS: [[f64; 3]; 4] = [[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.5]];

fn arb_cloud() -> impl Strategy<Value = Vec<[f64; 3]>> {
    prop::collection::vec(prop::array::uniform3(-10.0f64..10.0), 0..24).prop_map(|mut pts| {
                                                                          pts.extend_from_slice(&ANCHORS);
                                                                          pts
                                                                      })
}

fn arb_rotation() -> impl Strategy<Value = Rotation3<f64>> {
    (-3.1f64..3.1, -1.5f64..1.5, -3.1f64..3.1).prop_map(|(r, p, y)| Rotation3::from_euler_angles(r, p, y))
}

fn icosphere_like(n: usize) -> PointSet {
    // espiral de Fibonacci sobre la esfera unidad
    let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
    PointSet::new((0..n).map(|i| {
                            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
                            let r = (1.0 - y * y).sqrt();
                            let theta = golden * i as f64;
                            Point3::new(r * theta.cos(), y, r * theta.sin())
                        })
                        .collect())
}

fn cube() -> PointSet {
    let mut pts = Vec::new();
    for x in [-1.0, 1.0] {
        for y in [-1.0, 1.0] {
            for z in [-1.0, 1.0] {
                pts.push([x, y, z]);
            }
        }
    }
    PointSet::from(pts)
}

proptest! {
    #[test]
    fn recovers_any_similarity(cloud in arb_cloud(),
                               rot in arb_rotation(),
                               scale in 0.2f64..5.0,
                               tx in -50.0f64..50.0,
                               ty in -50.0f64..50.0,
                               tz in -50.0f64..50.0) {
        let source = PointSet::from_coords(&cloud);
        let translation = Vector3::new(tx, ty, tz);
        let target = PointSet::new(source.points()
                                         .iter()
                                         .map(|p| Point3::from(scale * (rot * p.coords) + translation))
                                         .collect());

        let t = compute_alignment(&source, &target).unwrap();

        prop_assert!((t.scale() - scale).abs() < 1e-6 * scale.max(1.0));
        prop_assert!((t.rotation() - rot.matrix()).norm() < 1e-6);
        prop_assert!((t.translation() - translation).norm() < 1e-5);
    }

    #[test]
    fn rotation_is_always_proper(a in prop::collection::vec(prop::array::uniform3(-5.0f64..5.0), 1..20),
                                 b in prop::collection::vec(prop::array::uniform3(-5.0f64..5.0), 1..20)) {
        let t = compute_alignment(&PointSet::from_coords(&a), &PointSet::from_coords(&b)).unwrap();
        prop_assert!((t.rotation().determinant() - 1.0).abs() < 1e-6);
        prop_assert!(t.is_finite());
        prop_assert!(t.scale() > 0.0);
    }
}

#[test]
fn cube_onto_sphere_is_finite_and_centered() {
    let src = cube();
    let dst = icosphere_like(42);
    let t = RigidAligner::new().align(&src, &dst).unwrap();

    assert!(t.is_finite());
    assert_relative_eq!(t.rotation().determinant(), 1.0, epsilon = 1e-9);
    // RMS del cubo centrado es sqrt(3)
    let dst_rms = (dst.centered().iter().map(|v| v.norm_squared()).sum::<f64>() / 42.0).sqrt();
    assert_relative_eq!(t.scale(), dst_rms / 3f64.sqrt(), epsilon = 1e-9);
    // el centroide de la fuente cae sobre el del destino
    let mapped = t.transform_point(&Point3::from(src.centroid()));
    assert_relative_eq!(mapped.coords, dst.centroid(), epsilon = 1e-9);
}

#[test]
fn homogeneous_rows_round_out_with_unit_corner() {
    let t = compute_alignment(&cube(), &cube()).unwrap();
    let rows = t.to_rows();
    assert_eq!(rows[3], [0.0, 0.0, 0.0, 1.0]);
}
