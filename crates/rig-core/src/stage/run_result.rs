use serde_json::Value;

use crate::{errors::RigError, model::Artifact};

/// Señal ligera emitida por un stage (p. ej. métricas de alineación). No
/// altera el estado principal; queda en el log de eventos.
#[derive(Debug, Clone)]
pub struct StageSignal {
    pub signal: String,
    pub data: Value,
}

/// Resultado abstracto de ejecutar un stage.
pub enum StageRunResult {
    Success { outputs: Vec<Artifact> },
    SuccessWithSignals { outputs: Vec<Artifact>, signals: Vec<StageSignal> },
    Failure { error: RigError },
}
