//! rig-align: registro de similitud en forma cerrada (Procrustes/SVD).
//!
//! Dado un `PointSet` fuente y uno destino calcula la `RigidTransform`
//! (rotación propia + escala uniforme + traslación) que mejor lleva la
//! fuente sobre el destino. No hay búsqueda de correspondencias: los puntos
//! se usan tal cual, por lo que la calidad depende de que ambas mallas
//! compartan pose canónica y estadísticas de centroide/extensión.
//!
//! ```
//! use rig_align::{compute_alignment, PointSet};
//!
//! let source = PointSet::from_coords(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
//! let target = PointSet::from_coords(&[[1.0, 2.0, 3.0], [3.0, 2.0, 3.0], [1.0, 4.0, 3.0], [1.0, 2.0, 5.0]]);
//!
//! let transform = compute_alignment(&source, &target).unwrap();
//! assert!((transform.scale() - 2.0).abs() < 1e-9);
//! ```

mod error;
mod point_set;
mod similarity;
mod transform;

pub use error::{AlignError, AlignResult};
pub use point_set::PointSet;
pub use similarity::{compute_alignment, RigidAligner};
pub use transform::RigidTransform;
