//! Similarity transform produced by the aligner.

use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Rotación propia (det = +1), escala uniforme positiva y traslación.
///
/// Se aplica en orden escala -> rotación -> traslación:
/// `p' = scale · R · p + translation`.
///
/// Sólo el aligner la construye; los consumidores la leen o la serializan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    rotation: Matrix3<f64>,
    scale: f64,
    translation: Vector3<f64>,
}

impl RigidTransform {
    pub(crate) fn new(rotation: Matrix3<f64>, scale: f64, translation: Vector3<f64>) -> Self {
        Self { rotation,
               scale,
               translation }
    }

    #[must_use]
    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), 1.0, Vector3::zeros())
    }

    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.scale * (self.rotation * point.coords) + self.translation)
    }

    /// Matriz homogénea 4×4 equivalente.
    #[must_use]
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0)
         .copy_from(&(self.rotation * self.scale));
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// Filas de la matriz homogénea, para scripts del motor externo.
    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        let m = self.to_homogeneous();
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = m[(r, c)];
            }
        }
        rows
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite()
        && self.rotation.iter().all(|v| v.is_finite())
        && self.translation.iter().all(|v| v.is_finite())
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}
