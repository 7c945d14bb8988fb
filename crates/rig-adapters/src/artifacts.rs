//! Artifacts tipados del pipeline de rigging.
//!
//! Sólo definen la forma del `payload` JSON; las rutas apuntan dentro del
//! workspace efímero del job y el coordinador calcula los hashes.

use std::path::PathBuf;

use rig_core::{ArtifactKind, ArtifactSpec, Fingerprint};
use serde::{Deserialize, Serialize};

/// Malla canónica producida por Prepare (un solo objeto, triangulada, GLB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedMesh {
    pub path: PathBuf,
    pub source_fingerprint: Fingerprint,
}

impl ArtifactSpec for PreparedMesh {
    const KIND: ArtifactKind = ArtifactKind::Mesh;
}

/// Malla canónica + transformación de similitud template -> malla.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedMesh {
    pub mesh: PathBuf,
    /// Homogénea 4×4 por filas, aplicada al template antes del rigging.
    pub matrix: [[f64; 4]; 4],
    pub scale: f64,
    pub template_points: usize,
    pub mesh_points: usize,
}

impl ArtifactSpec for AlignedMesh {
    const KIND: ArtifactKind = ArtifactKind::Alignment;

    fn validate(&self) -> Result<(), String> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(format!("invalid scale {}", self.scale));
        }
        if self.matrix.iter().flatten().any(|v| !v.is_finite()) {
            return Err("non-finite alignment matrix".into());
        }
        Ok(())
    }
}

/// Malla enlazada a la armature del template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiggedMesh {
    pub path: PathBuf,
}

impl ArtifactSpec for RiggedMesh {
    const KIND: ArtifactKind = ArtifactKind::Mesh;
}
