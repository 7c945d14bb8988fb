//! Tipado fuerte para `Artifact` manteniendo el núcleo agnóstico.
//! Cada stage describe su input/output con un tipo concreto que se
//! (de)serializa al payload JSON neutro.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::{Artifact, ArtifactKind};
use crate::errors::RigError;

/// Errores posibles al codificar/decodificar un artifact tipado.
#[derive(Debug, Error)]
pub enum ArtifactDecodeError {
    #[error("artifact kind mismatch: expected {expected:?}, found {found:?}")]
    KindMismatch { expected: ArtifactKind, found: ArtifactKind },
    #[error("schema version mismatch: expected {expected}, found {found:?}")]
    VersionMismatch { expected: u32, found: Option<u32> },
    #[error("serde: {0}")]
    Serde(String),
    #[error("validation: {0}")]
    Validation(String),
}

impl From<ArtifactDecodeError> for RigError {
    fn from(err: ArtifactDecodeError) -> Self {
        RigError::Internal(format!("artifact: {err}"))
    }
}

/// Especificación de un artifact tipado.
pub trait ArtifactSpec: Sized + Serialize + DeserializeOwned + Clone {
    /// Kind asociado (permite distinguir en runtime).
    const KIND: ArtifactKind;
    /// Versión de esquema (incrementar en cambios incompatibles).
    const SCHEMA_VERSION: u32 = 1;

    /// Validación semántica ligera (sin efectos secundarios). Opcional.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Serializa a `Artifact` sin hash (lo añade el coordinador).
    fn into_artifact(self) -> Result<Artifact, ArtifactDecodeError> {
        let mut value = serde_json::to_value(&self).map_err(|e| ArtifactDecodeError::Serde(e.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.entry("schema_version".to_string())
               .or_insert(Value::from(Self::SCHEMA_VERSION));
        }
        Ok(Artifact::new_unhashed(Self::KIND, value, None))
    }

    /// Decodifica desde artifact neutro verificando kind, versión y validación.
    fn from_artifact(a: &Artifact) -> Result<Self, ArtifactDecodeError> {
        if a.kind != Self::KIND {
            return Err(ArtifactDecodeError::KindMismatch { expected: Self::KIND,
                                                           found: a.kind });
        }
        let found_version = a.payload
                             .get("schema_version")
                             .and_then(|v| v.as_u64())
                             .map(|v| v as u32);
        if found_version != Some(Self::SCHEMA_VERSION) {
            return Err(ArtifactDecodeError::VersionMismatch { expected: Self::SCHEMA_VERSION,
                                                              found: found_version });
        }
        let decoded: Self =
            serde_json::from_value(a.payload.clone()).map_err(|e| ArtifactDecodeError::Serde(e.to_string()))?;
        decoded.validate().map_err(ArtifactDecodeError::Validation)?;
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        path: String,
    }

    impl ArtifactSpec for Sample {
        const KIND: ArtifactKind = ArtifactKind::Mesh;
        fn validate(&self) -> Result<(), String> {
            if self.path.is_empty() {
                return Err("empty path".into());
            }
            Ok(())
        }
    }

    #[test]
    fn encode_injects_schema_version() {
        let art = Sample { path: "a.glb".into() }.into_artifact().unwrap();
        assert_eq!(art.kind, ArtifactKind::Mesh);
        assert_eq!(art.payload["schema_version"], 1);
        assert_eq!(Sample::from_artifact(&art).unwrap(), Sample { path: "a.glb".into() });
    }

    #[test]
    fn decode_rejects_wrong_kind() {
        let mut art = Sample { path: "a.glb".into() }.into_artifact().unwrap();
        art.kind = ArtifactKind::Delivery;
        assert!(matches!(Sample::from_artifact(&art), Err(ArtifactDecodeError::KindMismatch { .. })));
    }

    #[test]
    fn decode_runs_validation() {
        let art = Sample { path: String::new() }.into_artifact().unwrap();
        assert!(matches!(Sample::from_artifact(&art), Err(ArtifactDecodeError::Validation(_))));
    }
}
