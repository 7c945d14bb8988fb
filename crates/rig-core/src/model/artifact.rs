//! Artifact neutral del pipeline.
//!
//! Un `Artifact` es la unidad de datos intercambiada entre stages:
//! - `payload` es JSON genérico (rutas dentro del workspace del job, matrices,
//!   etc.); el coordinador no interpreta su semántica.
//! - `hash` lo calcula el coordinador sobre el JSON canonicalizado y entra en
//!   el fingerprint del stage que lo produjo.
//! - `metadata` anota información auxiliar que no entra al hash.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Familias de artifact que circulan por el pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Bytes subidos por el caller, ya escritos en el workspace.
    Upload,
    /// Malla intermedia (canónica o riggeada).
    Mesh,
    /// Resultado de alineación (transformación de similitud).
    Alignment,
    /// Artifact final listo para publicar.
    Delivery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub hash: String,            // hash canonical del payload (asignado por el coordinador)
    pub payload: Value,          // contenido neutro JSON
    pub metadata: Option<Value>, // información auxiliar (no entra al hash)
}

impl Artifact {
    /// Constructor interno; preferir `ArtifactSpec::into_artifact`.
    pub(crate) fn new_unhashed(kind: ArtifactKind, payload: Value, metadata: Option<Value>) -> Self {
        Self { kind,
               hash: String::new(),
               payload,
               metadata }
    }
}
