use std::time::Duration;

use thiserror::Error;

use crate::mesh_engine::EngineOp;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("failed to launch engine '{program}': {detail}")]
    Spawn { program: String, detail: String },
    #[error("engine {operation} exited with status {code:?}")]
    NonZeroExit {
        operation: EngineOp,
        code: Option<i32>,
        stderr: String,
    },
    #[error("engine {operation} exited 0 but did not produce {path}")]
    MissingOutput { operation: EngineOp, path: String },
    #[error("engine {operation} exceeded its {}s ceiling", .ceiling.as_secs_f64())]
    Timeout {
        operation: EngineOp,
        ceiling: Duration,
        stderr: String,
    },
    #[error("engine {operation} produced unreadable output: {detail}")]
    Decode { operation: EngineOp, detail: String },
    #[error("engine io: {0}")]
    Io(String),
}

impl EngineError {
    /// stderr capturado del subproceso, si lo hubo.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            EngineError::NonZeroExit { stderr, .. } | EngineError::Timeout { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Io(e.to_string())
    }
}
