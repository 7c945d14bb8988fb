use rig_core::RigError;
use thiserror::Error;

/// Rechazos de un upload antes de crear el job.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("empty upload")]
    EmptyUpload,
    #[error("missing file extension")]
    MissingExtension,
    #[error("unsupported extension '.{0}'")]
    UnsupportedExtension(String),
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

impl From<DomainError> for RigError {
    fn from(err: DomainError) -> Self {
        RigError::Validation(err.to_string())
    }
}
