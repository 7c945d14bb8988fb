//! Implementaciones sobre filesystem.

mod events;

pub use events::FsEventStore;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rig_core::constants::ARTIFACT_EXTENSION;
use rig_core::{ArtifactLocator, ContentCache, Fingerprint, RigError};
use tempfile::NamedTempFile;

use crate::PersistenceError;

/// Disposición de la store: `<root>/<sha256-hex>.glb`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(format!("{fingerprint}.{ARTIFACT_EXTENSION}"))
    }

    /// Crea la raíz si falta.
    pub fn ensure(&self) -> Result<(), PersistenceError> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(PersistenceError::NotADirectory(self.root.display().to_string()));
        }
        fs::create_dir_all(&self.root).map_err(|e| PersistenceError::io(&self.root, e))
    }
}

/// Cache direccionada por contenido sobre un directorio.
///
/// La store misma es el índice: un proceso reiniciado encuentra los
/// artifacts producidos antes. `publish` copia a un temporal del mismo
/// directorio y lo renombra sobre el destino (last write wins); un `lookup`
/// concurrente ve el archivo anterior completo o el nuevo completo.
#[derive(Debug, Clone)]
pub struct FsContentCache {
    layout: StorageLayout,
}

impl FsContentCache {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let layout = StorageLayout::new(root);
        layout.ensure()?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Fingerprints presentes en la store, ordenados.
    pub fn fingerprints(&self) -> Result<Vec<Fingerprint>, PersistenceError> {
        let root = self.layout.root();
        let mut out = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| PersistenceError::io(root, e))? {
            let path = entry.map_err(|e| PersistenceError::io(root, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXTENSION) {
                continue;
            }
            if let Some(fp) = path.file_stem()
                                  .and_then(|s| s.to_str())
                                  .and_then(Fingerprint::from_hex)
            {
                out.push(fp);
            }
        }
        out.sort();
        Ok(out)
    }

    fn copy_atomically(&self, staged: &Path, dest: &Path) -> Result<(), PersistenceError> {
        let root = self.layout.root();
        let mut tmp = NamedTempFile::new_in(root).map_err(|e| PersistenceError::io(root, e))?;
        let mut src = File::open(staged).map_err(|e| PersistenceError::io(staged, e))?;
        io::copy(&mut src, tmp.as_file_mut()).map_err(|e| PersistenceError::io(tmp.path(), e))?;
        tmp.as_file()
           .sync_all()
           .map_err(|e| PersistenceError::io(tmp.path(), e))?;
        tmp.persist(dest)
           .map_err(|e| PersistenceError::io(dest, e.error))?;
        Ok(())
    }
}

impl ContentCache for FsContentCache {
    fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<ArtifactLocator>, RigError> {
        let path = self.layout.artifact_path(fingerprint);
        debug!("cache lookup {}", path.display());
        Ok(path.is_file().then(|| ArtifactLocator::new(path)))
    }

    fn publish(&self, fingerprint: &Fingerprint, staged: &Path) -> Result<ArtifactLocator, RigError> {
        let dest = self.layout.artifact_path(fingerprint);
        self.copy_atomically(staged, &dest)?;
        info!("cache publish {fingerprint} -> {}", dest.display());
        Ok(ArtifactLocator::new(dest))
    }
}
