//! Traducción de fallos del motor externo a la taxonomía `RigError`.
//!
//! El stderr completo ya quedó en el log del operador (rig-engine); aquí
//! sólo viaja un extracto acotado hacia el registro del job.

use rig_core::errors::stderr_excerpt;
use rig_core::RigError;
use rig_engine::EngineError;

/// Cómo reporta un stage los fallos del motor.
#[derive(Debug, Clone, Copy)]
pub struct FailureMap {
    pub stage: &'static str,
    /// exit status distinto de cero, o el motor no pudo lanzarse
    pub exit: fn(String) -> RigError,
    /// exit 0 sin el archivo de salida declarado
    pub missing: fn(String) -> RigError,
}

impl FailureMap {
    pub fn map(&self, err: EngineError) -> RigError {
        match err {
            EngineError::NonZeroExit { operation, code, stderr } => {
                let status = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                (self.exit)(format!("{operation} exited with {status}: {}", stderr_excerpt(&stderr)))
            }
            EngineError::Spawn { .. } => (self.exit)(err.to_string()),
            EngineError::MissingOutput { path, .. } => (self.missing)(path),
            EngineError::Timeout { ceiling, .. } => RigError::Timeout { stage: self.stage.to_string(),
                                                                        ceiling_secs: ceiling.as_secs_f64().ceil()
                                                                                      as u64 },
            EngineError::Decode { .. } => (self.exit)(err.to_string()),
            EngineError::Io(detail) => RigError::Io(detail),
        }
    }
}
