//! Closed-form similarity registration.
//!
//! Variante de Kabsch/Umeyama con escala isotrópica por cociente de RMS:
//!
//! 1. centroides y centrado de ambos conjuntos
//! 2. `scale = rms(target) / rms(source)` (1.0 si alguno no tiene varianza)
//! 3. `H = Σ s_i · t_iᵗ`
//! 4. `H = U·Σ·Vᵗ`, `R = V·Uᵗ`
//! 5. si `det(R) < 0` se niega la fila de `Vᵗ` del menor valor singular
//! 6. `translation = c_t − scale·R·c_s`
//!
//! Cuando las cardinalidades difieren, centroides y escala usan todos los
//! puntos y `H` empareja por índice sobre el prefijo común.

use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::{AlignError, AlignResult, PointSet, RigidTransform};

/// Varianza por debajo de la cual un conjunto se considera colapsado en un
/// punto, relativa a la magnitud del centroide.
const VARIANCE_EPS: f64 = 1e-20;

/// Calcula la transformación de similitud que lleva `source` sobre `target`.
///
/// # Errors
///
/// - `EmptySource` / `EmptyTarget` si algún conjunto no tiene puntos.
/// - `SvdFailed` si la descomposición no entrega `U` y `Vᵗ`.
/// - `NonFinite` si el resultado contiene NaN/Inf (coordenadas no finitas
///   en la entrada).
pub fn compute_alignment(source: &PointSet, target: &PointSet) -> AlignResult<RigidTransform> {
    if source.is_empty() {
        return Err(AlignError::EmptySource);
    }
    if target.is_empty() {
        return Err(AlignError::EmptyTarget);
    }

    let source_centroid = source.centroid();
    let target_centroid = target.centroid();
    let source_centered = source.centered();
    let target_centered = target.centered();

    let scale = isotropic_scale(&source_centered, &source_centroid, &target_centered, &target_centroid);

    let mut h = Matrix3::zeros();
    for (s, t) in source_centered.iter().zip(target_centered.iter()) {
        h += s * t.transpose();
    }

    let rotation = proper_rotation(h)?;
    let translation = target_centroid - scale * (rotation * source_centroid);

    let transform = RigidTransform::new(rotation, scale, translation);
    if !transform.is_finite() {
        return Err(AlignError::NonFinite("transform"));
    }
    debug!("alignment: {} -> {} points, scale={scale:.6}, det={:.6}",
           source.len(),
           target.len(),
           rotation.determinant());
    Ok(transform)
}

fn mean_square(centered: &[Vector3<f64>]) -> f64 {
    centered.iter().map(|v| v.norm_squared()).sum::<f64>() / centered.len() as f64
}

fn isotropic_scale(source_centered: &[Vector3<f64>],
                   source_centroid: &Vector3<f64>,
                   target_centered: &[Vector3<f64>],
                   target_centroid: &Vector3<f64>)
                   -> f64 {
    let ms_source = mean_square(source_centered);
    let ms_target = mean_square(target_centered);
    let collapsed = |ms: f64, c: &Vector3<f64>| ms <= VARIANCE_EPS * (1.0 + c.norm_squared());
    if collapsed(ms_source, source_centroid) || collapsed(ms_target, target_centroid) {
        return 1.0;
    }
    (ms_target / ms_source).sqrt()
}

/// Rotación que minimiza `Σ ||R·s_i − t_i||²` para `H = Σ s_i · t_iᵗ`,
/// forzada a det = +1.
fn proper_rotation(h: Matrix3<f64>) -> AlignResult<Matrix3<f64>> {
    if !h.iter().all(|v| v.is_finite()) {
        return Err(AlignError::NonFinite("cross-covariance"));
    }
    let svd = h.svd(true, true);
    let u = svd.u.ok_or(AlignError::SvdFailed)?;
    let mut v_t = svd.v_t.ok_or(AlignError::SvdFailed)?;

    let rotation = v_t.transpose() * u.transpose();
    if rotation.determinant() >= 0.0 {
        return Ok(rotation);
    }

    // Reflexión: negar la fila de Vᵗ asociada al menor valor singular
    let smallest = svd.singular_values.imin();
    for c in 0..3 {
        v_t[(smallest, c)] = -v_t[(smallest, c)];
    }
    Ok(v_t.transpose() * u.transpose())
}

/// Aligner sin estado; existe para inyectarse en stages y CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct RigidAligner;

impl RigidAligner {
    pub fn new() -> Self {
        Self
    }

    pub fn align(&self, source: &PointSet, target: &PointSet) -> AlignResult<RigidTransform> {
        compute_alignment(source, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Rotation3};

    fn tetra() -> PointSet {
        PointSet::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    #[test]
    fn identity_for_identical_sets() {
        let t = compute_alignment(&tetra(), &tetra()).unwrap();
        assert_relative_eq!(*t.rotation(), Matrix3::identity(), epsilon = 1e-9);
        assert_relative_eq!(t.scale(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(*t.translation(), Vector3::zeros(), epsilon = 1e-9);
    }

    #[test]
    fn recovers_rotation_scale_translation() {
        let r = Rotation3::from_euler_angles(0.3, -0.7, 1.1);
        let src = tetra();
        let dst = PointSet::new(src.points()
                                   .iter()
                                   .map(|p| Point3::from(1.5 * (r * p.coords) + Vector3::new(4.0, -2.0, 0.5)))
                                   .collect());
        let t = compute_alignment(&src, &dst).unwrap();
        assert_relative_eq!(*t.rotation(), *r.matrix(), epsilon = 1e-9);
        assert_relative_eq!(t.scale(), 1.5, epsilon = 1e-9);
        for (p, q) in src.points().iter().zip(dst.points()) {
            assert_relative_eq!(t.transform_point(p), *q, epsilon = 1e-9);
        }
    }

    #[test]
    fn mirrored_target_still_yields_proper_rotation() {
        let src = tetra();
        let mirrored = PointSet::new(src.points().iter().map(|p| Point3::new(-p.x, p.y, p.z)).collect());
        let t = compute_alignment(&src, &mirrored).unwrap();
        assert_relative_eq!(t.rotation().determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn collapsed_source_falls_back_to_unit_scale() {
        let src = PointSet::from_coords(&[[0.1, 0.2, 0.3]; 5]);
        let t = compute_alignment(&src, &tetra()).unwrap();
        assert_eq!(t.scale(), 1.0);
        assert!(t.is_finite());
    }

    #[test]
    fn collapsed_target_falls_back_to_unit_scale() {
        let dst = PointSet::from_coords(&[[7.0, 7.0, 7.0]; 3]);
        let t = compute_alignment(&tetra(), &dst).unwrap();
        assert_eq!(t.scale(), 1.0);
        assert!(t.is_finite());
    }

    #[test]
    fn empty_sets_are_degenerate_input() {
        let err = compute_alignment(&PointSet::default(), &tetra()).unwrap_err();
        assert_eq!(err, AlignError::EmptySource);
        assert!(err.is_degenerate_input());
        let err = compute_alignment(&tetra(), &PointSet::default()).unwrap_err();
        assert_eq!(err, AlignError::EmptyTarget);
    }

    #[test]
    fn non_finite_input_is_numerical() {
        let bad = PointSet::from_coords(&[[f64::NAN, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        let err = compute_alignment(&bad, &tetra()).unwrap_err();
        assert!(matches!(err, AlignError::NonFinite(_)));
        assert!(!err.is_degenerate_input());
    }
}
