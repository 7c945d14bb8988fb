use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Secuencia ordenada de posiciones en espacio mundo (vértices de una malla).
///
/// Inmutable una vez capturada.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointSet {
    points: Vec<Point3<f64>>,
}

impl PointSet {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn from_coords(coords: &[[f64; 3]]) -> Self {
        Self { points: coords.iter().map(|c| Point3::new(c[0], c[1], c[2])).collect() }
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Centroide; origen para un conjunto vacío.
    pub fn centroid(&self) -> Vector3<f64> {
        if self.points.is_empty() {
            return Vector3::zeros();
        }
        let sum = self.points
                      .iter()
                      .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        sum / self.points.len() as f64
    }

    /// Puntos trasladados para que el centroide quede en el origen.
    pub fn centered(&self) -> Vec<Vector3<f64>> {
        let c = self.centroid();
        self.points.iter().map(|p| p.coords - c).collect()
    }

    pub fn to_coords(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| [p.x, p.y, p.z]).collect()
    }
}

impl From<Vec<[f64; 3]>> for PointSet {
    fn from(coords: Vec<[f64; 3]>) -> Self {
        Self::from_coords(&coords)
    }
}
