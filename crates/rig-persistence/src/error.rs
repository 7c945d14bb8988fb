//! Errores de persistencia.

use std::path::Path;

use rig_core::RigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("storage root {0} is not a directory")]
    NotADirectory(String),
}

impl PersistenceError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.display().to_string(),
                   source }
    }
}

impl From<PersistenceError> for RigError {
    fn from(err: PersistenceError) -> Self {
        RigError::Io(err.to_string())
    }
}
