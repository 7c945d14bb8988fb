//! Core PipelineCoordinator implementation

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info, warn};
use serde_json::{json, Value};

use crate::cache::{CacheClaims, ContentCache};
use crate::constants::PIPELINE_VERSION;
use crate::errors::RigError;
use crate::event::{EventStore, PipelineEvent, PipelineEventKind};
use crate::hashing::hash_value;
use crate::model::{Artifact, ArtifactLocator, ArtifactSpec, DeliveredAsset, Fingerprint, InputAsset, JobId,
                   StageContext, StageFingerprintInput, UploadedAsset};
use crate::repo::{InMemoryRunRepository, PipelineDefinition, RunInstance, RunRepository};
use crate::stage::{StageDefinition, StageRunResult, StageSignal};

/// Coordinador de corridas del pipeline.
///
/// Para cada job: consulta la cache por fingerprint, y en un miss ejecuta los
/// stages en orden dentro de un workspace efímero, publica el artifact final
/// y elimina los intermedios. Cualquier fallo de stage es terminal para la
/// corrida y nunca se publica en la cache.
///
/// Es `Sync`: varios workers pueden invocar `run` en paralelo.
pub struct PipelineCoordinator<E: EventStore> {
    event_store: E,
    cache: Arc<dyn ContentCache>,
    claims: CacheClaims,
    scratch_root: PathBuf,
}

impl<E: EventStore> PipelineCoordinator<E> {
    pub fn new(event_store: E, cache: Arc<dyn ContentCache>, scratch_root: PathBuf) -> Self {
        Self { event_store,
               cache,
               claims: CacheClaims::new(),
               scratch_root }
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    pub fn cache(&self) -> &Arc<dyn ContentCache> {
        &self.cache
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Eventos registrados para un job.
    pub fn events_for(&self, job_id: JobId) -> Vec<PipelineEvent> {
        self.event_store.list(job_id)
    }

    /// Progreso por stage reconstruido desde los eventos.
    pub fn progress(&self, job_id: JobId, definition: &PipelineDefinition) -> RunInstance {
        InMemoryRunRepository::new().load(job_id, &self.events_for(job_id), definition)
    }

    /// Ejecuta una corrida completa y devuelve el locator publicado.
    ///
    /// Bloquea el hilo llamador mientras los stages esperan a colaboradores
    /// externos; pensado para correr en un worker dedicado.
    pub fn run(&self,
               job_id: JobId,
               asset: &InputAsset,
               definition: &PipelineDefinition)
               -> Result<ArtifactLocator, RigError> {
        let fingerprint = asset.fingerprint().clone();
        self.event_store
            .append_kind(job_id,
                         PipelineEventKind::PipelineInitialized { definition_hash: definition.definition_hash.clone(),
                                                                  stage_count: definition.len(),
                                                                  fingerprint: fingerprint.clone() });

        if let Some(locator) = self.cached(job_id, &fingerprint)? {
            return Ok(locator);
        }

        let slot = self.claims.slot(&fingerprint);
        let result = {
            let _claim = CacheClaims::acquire(&slot);
            // Una corrida concurrente del mismo contenido pudo publicar mientras esperábamos
            match self.cached(job_id, &fingerprint) {
                Ok(Some(locator)) => Ok(locator),
                Ok(None) => self.execute(job_id, asset, definition),
                Err(e) => Err(e),
            }
        };
        drop(slot);
        self.claims.release(&fingerprint);
        result
    }

    fn cached(&self, job_id: JobId, fingerprint: &Fingerprint) -> Result<Option<ArtifactLocator>, RigError> {
        let hit = self.cache.lookup(fingerprint)?;
        match &hit {
            Some(locator) => {
                info!("job {job_id}: cache hit {fingerprint} -> {locator}");
                self.event_store
                    .append_kind(job_id,
                                 PipelineEventKind::CacheHit { fingerprint: fingerprint.clone(),
                                                               locator: locator.clone() });
            }
            None => info!("job {job_id}: cache miss {fingerprint}"),
        }
        Ok(hit)
    }

    fn execute(&self,
               job_id: JobId,
               asset: &InputAsset,
               definition: &PipelineDefinition)
               -> Result<ArtifactLocator, RigError> {
        let workspace = match tempfile::Builder::new().prefix("rig-job-")
                                                      .tempdir_in(&self.scratch_root)
        {
            Ok(dir) => dir,
            Err(e) => return Err(self.abort(job_id, RigError::Io(format!("workspace: {e}")))),
        };

        let outcome = self.execute_in(job_id, asset, definition, workspace.path());

        // Intermedios fuera, haya éxito o no; el artifact final ya fue copiado a la store
        let ws_path = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            warn!("job {job_id}: failed to remove workspace {}: {e}", ws_path.display());
        }
        outcome
    }

    fn execute_in(&self,
                  job_id: JobId,
                  asset: &InputAsset,
                  definition: &PipelineDefinition,
                  workspace: &Path)
                  -> Result<ArtifactLocator, RigError> {
        let upload_path = workspace.join(format!("upload.{}", asset.extension()));
        if let Err(e) = std::fs::write(&upload_path, asset.bytes()) {
            return Err(self.abort(job_id, RigError::Io(format!("writing upload: {e}"))));
        }
        let seed = UploadedAsset { path: upload_path,
                                   extension: asset.extension().to_string(),
                                   fingerprint: asset.fingerprint().clone() };
        let mut current = match seed.into_artifact() {
            Ok(mut art) => {
                art.hash = relocatable_hash(&art.payload, workspace);
                art
            }
            Err(e) => return Err(self.abort(job_id, e.into())),
        };

        for (index, stage) in definition.stages.iter().enumerate() {
            current = self.run_stage(job_id, index, stage.as_ref(), current, definition, workspace)?;
        }

        let delivered = match DeliveredAsset::from_artifact(&current) {
            Ok(d) => d,
            Err(e) => return Err(self.abort(job_id, e.into())),
        };
        if !delivered.path.is_file() {
            let err = RigError::MissingOutput(delivered.path.display().to_string());
            return Err(self.abort(job_id, err));
        }

        let locator = match self.cache.publish(asset.fingerprint(), &delivered.path) {
            Ok(l) => l,
            Err(e) => return Err(self.abort(job_id, e)),
        };
        info!("job {job_id}: published {} -> {locator}", asset.fingerprint());
        self.event_store
            .append_kind(job_id,
                         PipelineEventKind::ArtifactPublished { fingerprint: asset.fingerprint().clone(),
                                                                locator: locator.clone() });
        self.complete(job_id, definition);
        Ok(locator)
    }

    fn run_stage(&self,
                 job_id: JobId,
                 index: usize,
                 stage: &dyn StageDefinition,
                 input: Artifact,
                 definition: &PipelineDefinition,
                 workspace: &Path)
                 -> Result<Artifact, RigError> {
        info!("job {job_id}: stage {index} '{}' started", stage.id());
        self.event_store
            .append_kind(job_id,
                         PipelineEventKind::StageStarted { stage_index: index,
                                                           stage_id: stage.id().to_string() });

        let input_hash = input.hash.clone();
        let ctx = StageContext::new(job_id, input, stage.base_params(), workspace.to_path_buf());
        let (outputs, signals) = match stage.run(&ctx) {
            StageRunResult::Success { outputs } => (outputs, Vec::new()),
            StageRunResult::SuccessWithSignals { outputs, signals } => (outputs, signals),
            StageRunResult::Failure { error } => {
                return Err(self.fail_stage(job_id, index, stage, &input_hash, definition, error));
            }
        };

        if outputs.is_empty() {
            let err = RigError::Internal(format!("stage '{}' produced no output", stage.id()));
            return Err(self.fail_stage(job_id, index, stage, &input_hash, definition, err));
        }

        self.emit_signals(job_id, index, stage, signals);

        let mut outputs = outputs;
        let output_hashes: Vec<String> = outputs.iter_mut()
                                                .map(|o| {
                                                    o.hash = relocatable_hash(&o.payload, workspace);
                                                    o.hash.clone()
                                                })
                                                .collect();
        let fingerprint = self.stage_fingerprint(index, stage, &input_hash, &output_hashes, definition);
        self.event_store
            .append_kind(job_id,
                         PipelineEventKind::StageFinished { stage_index: index,
                                                            stage_id: stage.id().to_string(),
                                                            outputs: output_hashes,
                                                            fingerprint });
        info!("job {job_id}: stage {index} '{}' finished", stage.id());

        // Pipeline lineal: el primer output alimenta al siguiente stage
        Ok(outputs.swap_remove(0))
    }

    fn emit_signals(&self, job_id: JobId, index: usize, stage: &dyn StageDefinition, signals: Vec<StageSignal>) {
        for s in signals {
            self.event_store
                .append_kind(job_id,
                             PipelineEventKind::StageSignal { stage_index: index,
                                                              stage_id: stage.id().to_string(),
                                                              signal: s.signal,
                                                              data: s.data });
        }
    }

    fn fail_stage(&self,
                  job_id: JobId,
                  index: usize,
                  stage: &dyn StageDefinition,
                  input_hash: &str,
                  definition: &PipelineDefinition,
                  error: RigError)
                  -> RigError {
        error!("job {job_id}: stage {index} '{}' failed: {error}", stage.id());
        let fingerprint = self.stage_fingerprint(index, stage, input_hash, &[], definition);
        self.event_store
            .append_kind(job_id,
                         PipelineEventKind::StageFailed { stage_index: index,
                                                          stage_id: stage.id().to_string(),
                                                          error: error.clone(),
                                                          fingerprint });
        error
    }

    fn abort(&self, job_id: JobId, error: RigError) -> RigError {
        error!("job {job_id}: pipeline aborted: {error}");
        self.event_store
            .append_kind(job_id, PipelineEventKind::PipelineAborted { error: error.clone() });
        error
    }

    fn stage_fingerprint(&self,
                         index: usize,
                         stage: &dyn StageDefinition,
                         input_hash: &str,
                         output_hashes: &[String],
                         definition: &PipelineDefinition)
                         -> String {
        let params = stage.base_params();
        let input = StageFingerprintInput { pipeline_version: PIPELINE_VERSION,
                                            definition_hash: &definition.definition_hash,
                                            stage_index: index,
                                            stage_id: stage.id(),
                                            input_hash,
                                            output_hashes,
                                            params: &params };
        hash_value(&serde_json::to_value(&input).unwrap_or_default())
    }

    fn complete(&self, job_id: JobId, definition: &PipelineDefinition) {
        let stage_fps: Vec<String> = self.event_store
                                         .list(job_id)
                                         .iter()
                                         .filter_map(|e| match &e.kind {
                                             PipelineEventKind::StageFinished { fingerprint, .. } => {
                                                 Some(fingerprint.clone())
                                             }
                                             _ => None,
                                         })
                                         .collect();
        let run_fingerprint = hash_value(&json!({
                                             "pipeline_version": PIPELINE_VERSION,
                                             "definition_hash": definition.definition_hash,
                                             "stage_fingerprints": stage_fps
                                         }));
        self.event_store
            .append_kind(job_id, PipelineEventKind::PipelineCompleted { run_fingerprint });
    }
}

/// Hash del payload con las rutas del workspace reescritas como relativas,
/// para que el mismo contenido produzca el mismo hash sin importar dónde se
/// creó el directorio scratch de la corrida.
fn relocatable_hash(payload: &Value, workspace: &Path) -> String {
    let prefix = workspace.to_string_lossy();
    hash_value(&relativize(payload, &prefix))
}

fn relativize(value: &Value, prefix: &str) -> Value {
    match value {
        Value::String(s) => match s.strip_prefix(prefix) {
            Some(rest) => Value::String(format!("$WORKSPACE{rest}")),
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(|v| relativize(v, prefix)).collect()),
        Value::Object(map) => Value::Object(map.iter()
                                               .map(|(k, v)| (k.clone(), relativize(v, prefix)))
                                               .collect()),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relocatable_hash_ignores_workspace_location() {
        let a = json!({"path": "/tmp/rig-job-aaa/mesh.glb", "scale": 2.0});
        let b = json!({"path": "/var/tmp/rig-job-bbb/mesh.glb", "scale": 2.0});
        assert_eq!(relocatable_hash(&a, Path::new("/tmp/rig-job-aaa")),
                   relocatable_hash(&b, Path::new("/var/tmp/rig-job-bbb")));
        assert_ne!(relocatable_hash(&a, Path::new("/tmp/rig-job-aaa")),
                   relocatable_hash(&a, Path::new("/elsewhere")));
    }
}
