//! Error types for alignment.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignError {
    #[error("source point set is empty")]
    EmptySource,

    #[error("target point set is empty")]
    EmptyTarget,

    /// SVD did not produce U / Vᵗ.
    #[error("SVD computation failed during alignment")]
    SvdFailed,

    #[error("alignment produced a non-finite {0}")]
    NonFinite(&'static str),
}

impl AlignError {
    /// Entradas vacías son un problema del input; el resto es numérico.
    pub fn is_degenerate_input(&self) -> bool {
        matches!(self, AlignError::EmptySource | AlignError::EmptyTarget)
    }
}

pub type AlignResult<T> = Result<T, AlignError>;
