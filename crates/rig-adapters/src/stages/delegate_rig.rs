use std::fmt;
use std::sync::Arc;

use log::info;
use rig_core::{RigError, StageContext, StageKind, StageRunResultTyped, TypedStage};
use rig_engine::{MeshEngine, RigRequest};
use serde::{Deserialize, Serialize};

use crate::engine_errors::FailureMap;
use crate::{AlignedMesh, RiggedMesh, Template};

const FAILURES: FailureMap = FailureMap { stage: "delegate_rig",
                                          exit: RigError::Rigging,
                                          missing: RigError::MissingOutput };

/// Suavizado laplaciano de pesos tras la transferencia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigParams {
    pub smooth_iterations: u32,
    pub smooth_factor: f64,
}

impl Default for RigParams {
    fn default() -> Self {
        Self { smooth_iterations: 10,
               smooth_factor: 0.5 }
    }
}

/// Delega al motor la transferencia de pesos, el enlace a la armature y la
/// exportación.
pub struct DelegateRigStage {
    engine: Arc<dyn MeshEngine>,
    template: Arc<Template>,
    params: RigParams,
}

impl DelegateRigStage {
    pub fn new(engine: Arc<dyn MeshEngine>, template: Arc<Template>) -> Self {
        Self { engine,
               template,
               params: RigParams::default() }
    }

    pub fn with_params(mut self, params: RigParams) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Debug for DelegateRigStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateRigStage")
         .field("template", &self.template.path())
         .field("params", &self.params)
         .finish_non_exhaustive()
    }
}

impl TypedStage for DelegateRigStage {
    type Params = RigParams;
    type Input = AlignedMesh;
    type Output = RiggedMesh;

    fn id(&self) -> &'static str {
        "delegate_rig"
    }

    fn kind(&self) -> StageKind {
        StageKind::DelegateRig
    }

    fn params_default(&self) -> RigParams {
        self.params.clone()
    }

    fn run_typed(&self, input: AlignedMesh, params: RigParams, ctx: &StageContext) -> StageRunResultTyped<RiggedMesh> {
        let output = ctx.scratch_path("rigged.glb");
        let request = RigRequest { input: input.mesh,
                                   template: self.template.path().to_path_buf(),
                                   output: output.clone(),
                                   matrix: input.matrix,
                                   smooth_iterations: params.smooth_iterations,
                                   smooth_factor: params.smooth_factor };
        if let Err(e) = self.engine.rig(&request) {
            return StageRunResultTyped::Failure { error: FAILURES.map(e) };
        }
        // exit 0 con salida ausente nunca se acepta
        if !output.is_file() {
            return StageRunResultTyped::Failure { error: RigError::MissingOutput(output.display().to_string()) };
        }
        info!("job {}: rigged against armature '{}'", ctx.job_id, self.template.armature().name);
        StageRunResultTyped::Success { output: RiggedMesh { path: output } }
    }
}
