//! Geometría de prueba.

use std::collections::HashMap;

use super::{FakeMesh, FakeScene};
use crate::ArmatureInfo;

/// Cubo unitario centrado en el origen, 8 vértices, como OBJ.
pub fn cube_obj() -> String {
    let mut out = String::from("# unit cube\no Cube\n");
    for x in [-0.5, 0.5] {
        for y in [-0.5, 0.5] {
            for z in [-0.5, 0.5] {
                out.push_str(&format!("v {x} {y} {z}\n"));
            }
        }
    }
    out.push_str("f 1 2 4 3\nf 5 6 8 7\nf 1 2 6 5\nf 3 4 8 7\nf 1 3 7 5\nf 2 4 8 6\n");
    out
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [[0, 11, 5],
                                              [0, 5, 1],
                                              [0, 1, 7],
                                              [0, 7, 10],
                                              [0, 10, 11],
                                              [1, 5, 9],
                                              [5, 11, 4],
                                              [11, 10, 2],
                                              [10, 7, 6],
                                              [7, 1, 8],
                                              [3, 9, 4],
                                              [3, 4, 2],
                                              [3, 2, 6],
                                              [3, 6, 8],
                                              [3, 8, 9],
                                              [4, 9, 5],
                                              [2, 4, 11],
                                              [6, 2, 10],
                                              [8, 6, 7],
                                              [9, 8, 1]];

fn normalize(v: [f64; 3], radius: f64) -> [f64; 3] {
    let n = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / n * radius, v[1] / n * radius, v[2] / n * radius]
}

/// Icosfera con una subdivisión: 12 vértices del icosaedro + 30 puntos
/// medios de arista = 42 vértices sobre la esfera de radio `radius`.
pub fn icosphere(radius: f64) -> Vec<[f64; 3]> {
    let t = (1.0 + 5f64.sqrt()) / 2.0;
    let base = [[-1.0, t, 0.0],
                [1.0, t, 0.0],
                [-1.0, -t, 0.0],
                [1.0, -t, 0.0],
                [0.0, -1.0, t],
                [0.0, 1.0, t],
                [0.0, -1.0, -t],
                [0.0, 1.0, -t],
                [t, 0.0, -1.0],
                [t, 0.0, 1.0],
                [-t, 0.0, -1.0],
                [-t, 0.0, 1.0]];
    let mut verts: Vec<[f64; 3]> = base.iter().map(|v| normalize(*v, radius)).collect();
    let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
    for face in ICOSAHEDRON_FACES {
        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            let key = (a.min(b), a.max(b));
            if midpoints.contains_key(&key) {
                continue;
            }
            let (pa, pb) = (verts[a], verts[b]);
            let mid = normalize([(pa[0] + pb[0]) / 2.0, (pa[1] + pb[1]) / 2.0, (pa[2] + pb[2]) / 2.0], radius);
            verts.push(mid);
            midpoints.insert(key, verts.len() - 1);
        }
    }
    verts
}

/// Template de prueba: una armature con `bones` y una malla icosfera (42).
pub fn template_scene(bones: &[&str]) -> String {
    FakeScene { armatures: vec![ArmatureInfo { name: "Armature".into(),
                                               bones: bones.iter().map(|b| b.to_string()).collect() }],
                meshes: vec![FakeMesh { name: "Body".into(),
                                        vertices: icosphere(1.0) }],
                transform: None,
                parent: None }.render()
}
