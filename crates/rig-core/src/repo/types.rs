//! Tipos de repositorio: progreso reconstruido (`RunInstance`) y definición
//! inmutable del pipeline (`PipelineDefinition`).
//!
//! El repositorio aplica un replay lineal: consume los eventos de un job en
//! orden y devuelve el estado de cada stage. No guarda artifacts, sólo hashes.
use chrono::{DateTime, Utc};

use crate::event::{PipelineEvent, PipelineEventKind};
use crate::model::JobId;
use crate::stage::{StageDefinition, StageStatus};

pub struct RunInstance {
    pub job_id: JobId,
    pub stages: Vec<StageSlot>,
    pub cursor: usize,
    pub cache_hit: bool,
    pub completed: bool,
    pub failed: bool,
}

/// Estado de un stage en la instancia.
pub struct StageSlot {
    pub stage_id: String,
    pub status: StageStatus,
    pub fingerprint: Option<String>,
    pub outputs: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Trait para reconstruir (`replay`) el progreso de una corrida.
pub trait RunRepository {
    fn load(&self, job_id: JobId, events: &[PipelineEvent], definition: &PipelineDefinition) -> RunInstance;
}

/// Definición inmutable del pipeline.
pub struct PipelineDefinition {
    pub stages: Vec<Box<dyn StageDefinition>>,
    pub definition_hash: String,
}

impl PipelineDefinition {
    pub fn new(stages: Vec<Box<dyn StageDefinition>>, definition_hash: String) -> Self {
        Self { stages,
               definition_hash }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_ids(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.id()).collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRunRepository;

impl InMemoryRunRepository {
    pub fn new() -> Self {
        Self
    }
}

impl RunRepository for InMemoryRunRepository {
    fn load(&self, job_id: JobId, events: &[PipelineEvent], definition: &PipelineDefinition) -> RunInstance {
        let mut stages: Vec<StageSlot> = definition.stages
                                                   .iter()
                                                   .map(|s| StageSlot { stage_id: s.id().to_string(),
                                                                        status: StageStatus::Pending,
                                                                        fingerprint: None,
                                                                        outputs: vec![],
                                                                        started_at: None,
                                                                        finished_at: None })
                                                   .collect();
        let mut completed = false;
        let mut failed = false;
        let mut cache_hit = false;
        for ev in events {
            match &ev.kind {
                PipelineEventKind::StageStarted { stage_index, .. } => {
                    if let Some(slot) = stages.get_mut(*stage_index) {
                        slot.status = StageStatus::Running;
                        slot.started_at = Some(ev.ts);
                    }
                }
                PipelineEventKind::StageFinished { stage_index,
                                                   fingerprint,
                                                   outputs,
                                                   .. } => {
                    if let Some(slot) = stages.get_mut(*stage_index) {
                        slot.status = StageStatus::FinishedOk;
                        slot.fingerprint = Some(fingerprint.clone());
                        slot.outputs = outputs.clone();
                        slot.finished_at = Some(ev.ts);
                    }
                }
                PipelineEventKind::StageFailed { stage_index, fingerprint, .. } => {
                    if let Some(slot) = stages.get_mut(*stage_index) {
                        slot.status = StageStatus::Failed;
                        slot.fingerprint = Some(fingerprint.clone());
                        slot.finished_at = Some(ev.ts);
                    }
                    failed = true;
                }
                PipelineEventKind::CacheHit { .. } => {
                    cache_hit = true;
                    for slot in stages.iter_mut() {
                        slot.status = StageStatus::Skipped;
                    }
                }
                PipelineEventKind::PipelineAborted { .. } => failed = true,
                PipelineEventKind::PipelineCompleted { .. } => completed = true,
                PipelineEventKind::PipelineInitialized { .. }
                | PipelineEventKind::StageSignal { .. }
                | PipelineEventKind::ArtifactPublished { .. } => {}
            }
        }
        let cursor = stages.iter()
                           .position(|s| matches!(s.status, StageStatus::Pending))
                           .unwrap_or(stages.len());
        RunInstance { job_id,
                      stages,
                      cursor,
                      cache_hit,
                      completed,
                      failed }
    }
}

pub fn build_pipeline_definition(stages: Vec<Box<dyn StageDefinition>>) -> PipelineDefinition {
    use crate::hashing::hash_value;
    use serde_json::json;
    let parts: Vec<serde_json::Value> = stages.iter()
                                              .map(|s| json!({ "id": s.id(), "definition_hash": s.definition_hash() }))
                                              .collect();
    let definition_hash = hash_value(&json!(parts));
    PipelineDefinition::new(stages, definition_hash)
}
