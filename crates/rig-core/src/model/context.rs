use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{Artifact, JobId};

/// Contexto de ejecución entregado a `StageDefinition::run`.
pub struct StageContext {
    pub job_id: JobId,
    pub input: Artifact, // output del stage anterior (o el upload para el primero)
    pub params: Value,   // parámetros canónicos del stage
    workspace: PathBuf,  // directorio scratch del job; se elimina al terminar
}

impl StageContext {
    pub fn new(job_id: JobId, input: Artifact, params: Value, workspace: PathBuf) -> Self {
        Self { job_id,
               input,
               params,
               workspace }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Ruta para un archivo intermedio dentro del workspace del job.
    pub fn scratch_path(&self, file_name: &str) -> PathBuf {
        self.workspace.join(file_name)
    }
}
