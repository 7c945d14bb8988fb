use std::fmt;
use std::sync::Arc;

use log::info;
use rig_core::{RigError, StageContext, StageKind, StageRunResultTyped, TypedStage, UploadedAsset};
use rig_engine::MeshEngine;

use crate::engine_errors::FailureMap;
use crate::PreparedMesh;

const FAILURES: FailureMap = FailureMap { stage: "prepare",
                                          exit: RigError::Preprocess,
                                          missing: RigError::Preprocess };

/// Normaliza el upload en una malla canónica vía el motor externo.
pub struct PrepareStage {
    engine: Arc<dyn MeshEngine>,
}

impl PrepareStage {
    pub fn new(engine: Arc<dyn MeshEngine>) -> Self {
        Self { engine }
    }
}

impl fmt::Debug for PrepareStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrepareStage").finish_non_exhaustive()
    }
}

impl TypedStage for PrepareStage {
    type Params = ();
    type Input = UploadedAsset;
    type Output = PreparedMesh;

    fn id(&self) -> &'static str {
        "prepare"
    }

    fn kind(&self) -> StageKind {
        StageKind::Prepare
    }

    fn run_typed(&self, input: UploadedAsset, _p: (), ctx: &StageContext) -> StageRunResultTyped<PreparedMesh> {
        let output = ctx.scratch_path("canonical.glb");
        if let Err(e) = self.engine.prepare(&input.path, &output) {
            return StageRunResultTyped::Failure { error: FAILURES.map(e) };
        }
        if !output.is_file() {
            return StageRunResultTyped::Failure { error: RigError::Preprocess(format!("engine produced no output at {}",
                                                                                      output.display())) };
        }
        info!("job {}: canonical mesh ready", ctx.job_id);
        StageRunResultTyped::Success { output: PreparedMesh { path: output,
                                                              source_fingerprint: input.fingerprint } }
    }
}
