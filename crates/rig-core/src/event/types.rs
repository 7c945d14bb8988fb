//! Tipos de evento del pipeline y estructura `PipelineEvent`.
//!
//! Rol en el flujo:
//! - Cada corrida del `PipelineCoordinator` emite eventos a un `EventStore`
//!   append-only, indexado por `JobId`.
//! - `RunRepository` reconstruye el progreso por stage a partir de ellos
//!   (replay) sin depender de estructuras mutables.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::RigError;
use crate::model::{ArtifactLocator, Fingerprint, JobId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEventKind {
    /// Primer evento de una corrida: fija `definition_hash`, cantidad de
    /// stages y el fingerprint de contenido del upload.
    PipelineInitialized {
        definition_hash: String,
        stage_count: usize,
        fingerprint: Fingerprint,
    },
    /// La cache ya tenía un artifact para este contenido; no corre ningún stage.
    CacheHit { fingerprint: Fingerprint, locator: ArtifactLocator },
    /// Un stage comenzó su ejecución. No implica éxito.
    StageStarted { stage_index: usize, stage_id: String },
    /// Un stage terminó correctamente, con sus outputs (hashes) y fingerprint.
    StageFinished {
        stage_index: usize,
        stage_id: String,
        outputs: Vec<String>,
        fingerprint: String,
    },
    /// Un stage terminó con error terminal. La corrida no continúa.
    StageFailed {
        stage_index: usize,
        stage_id: String,
        error: RigError,
        fingerprint: String,
    },
    /// Señal informativa de un stage (no altera estado).
    StageSignal {
        stage_index: usize,
        stage_id: String,
        signal: String,
        data: serde_json::Value,
    },
    /// El artifact final quedó publicado en la store de contenido.
    ArtifactPublished { fingerprint: Fingerprint, locator: ArtifactLocator },
    /// Fallo fuera de un stage (workspace, publicación).
    PipelineAborted { error: RigError },
    /// Cierre con fingerprint agregado de los stages exitosos.
    PipelineCompleted { run_fingerprint: String },
}

impl PipelineEventKind {
    /// Último evento que el coordinador escribe para una corrida.
    pub fn closes_run(&self) -> bool {
        matches!(self,
                 PipelineEventKind::StageFailed { .. }
                 | PipelineEventKind::PipelineAborted { .. }
                 | PipelineEventKind::PipelineCompleted { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub job_id: JobId,
    pub kind: PipelineEventKind,
    pub ts: DateTime<Utc>, // metadato (no entra en fingerprint)
}
