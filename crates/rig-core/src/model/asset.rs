//! Upload de entrada, locator de artifacts publicados y los artifacts
//! tipados de frontera (primer input y último output del pipeline).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ArtifactKind, ArtifactSpec, Fingerprint};

/// Forma canónica de una extensión: sin espacios, sin punto inicial, en
/// minúsculas.
pub fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Bytes subidos por el caller más la extensión declarada.
#[derive(Debug, Clone)]
pub struct InputAsset {
    bytes: Vec<u8>,
    extension: String,
    fingerprint: Fingerprint,
}

impl InputAsset {
    /// El fingerprint depende sólo de los bytes, no de la extensión.
    pub fn new(bytes: Vec<u8>, extension: &str) -> Self {
        let fingerprint = Fingerprint::of_bytes(&bytes);
        Self { bytes,
               extension: normalize_extension(extension),
               fingerprint }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Ubicación de un artifact publicado en la store de contenido.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactLocator(PathBuf);

impl ArtifactLocator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ArtifactLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Primer artifact del pipeline: el upload ya escrito en el workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub path: PathBuf,
    pub extension: String,
    pub fingerprint: Fingerprint,
}

impl ArtifactSpec for UploadedAsset {
    const KIND: ArtifactKind = ArtifactKind::Upload;
}

/// Último artifact del pipeline: archivo listo para publicar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveredAsset {
    pub path: PathBuf,
}

impl ArtifactSpec for DeliveredAsset {
    const KIND: ArtifactKind = ArtifactKind::Delivery;

    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("delivered asset without path".into());
        }
        Ok(())
    }
}
