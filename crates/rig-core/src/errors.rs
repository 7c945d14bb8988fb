//! Taxonomía de errores del pipeline de rigging.
//!
//! Los errores son `Clone + Serialize` porque viajan dentro de los eventos
//! (`StageFailed`) y se guardan en el registro de jobs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::STDERR_EXCERPT_LIMIT;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum RigError {
    #[error("invalid input: {0}")] Validation(String),
    #[error("preprocessing failed: {0}")] Preprocess(String),
    #[error("rigging failed: {0}")] Rigging(String),
    #[error("engine reported success but output is missing: {0}")] MissingOutput(String),
    #[error("stage '{stage}' exceeded its {ceiling_secs}s ceiling")] Timeout { stage: String, ceiling_secs: u64 },
    #[error("numerical failure: {0}")] Numerical(String),
    #[error("degenerate input: {0}")] DegenerateInput(String),
    #[error("consistency violation: {0}")] Consistency(String),
    #[error("not found: {0}")] NotFound(String),
    #[error("invalid job transition {from} -> {to}")] InvalidTransition { from: String, to: String },
    #[error("io: {0}")] Io(String),
    #[error("internal: {0}")] Internal(String),
}

impl RigError {
    /// Código estable del tipo de error, usado en los registros de fallo.
    pub fn code(&self) -> &'static str {
        match self {
            RigError::Validation(_) => "ValidationError",
            RigError::Preprocess(_) => "PreprocessError",
            RigError::Rigging(_) => "RiggingError",
            RigError::MissingOutput(_) => "MissingOutputError",
            RigError::Timeout { .. } => "TimeoutError",
            RigError::Numerical(_) => "NumericalError",
            RigError::DegenerateInput(_) => "DegenerateInputError",
            RigError::Consistency(_) => "ConsistencyError",
            RigError::NotFound(_) => "NotFoundError",
            RigError::InvalidTransition { .. } => "InvalidTransitionError",
            RigError::Io(_) => "IoError",
            RigError::Internal(_) => "InternalError",
        }
    }

    /// Resumen apto para el caller: `<code>: <mensaje>`.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.code(), self)
    }
}

impl From<std::io::Error> for RigError {
    fn from(err: std::io::Error) -> Self {
        RigError::Io(err.to_string())
    }
}

/// Recorta un stderr a su cola (lo más reciente suele ser la causa) sin
/// partir caracteres UTF-8.
pub fn stderr_excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.len() <= STDERR_EXCERPT_LIMIT {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_EXCERPT_LIMIT;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &trimmed[start..])
}
