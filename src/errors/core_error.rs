use rig_core::RigError;
use rig_persistence::PersistenceError;
use thiserror::Error;

/// Errores de arranque del servicio (configuración, storage, template).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error de almacenamiento: {0}")]
    Storage(#[from] PersistenceError),
    #[error("Error de pipeline: {}", .0.summary())]
    Pipeline(#[from] RigError),
}
