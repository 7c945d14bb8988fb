use std::fmt;
use std::sync::Arc;

use log::info;
use rig_align::{AlignError, PointSet, RigidAligner};
use rig_core::{RigError, StageContext, StageKind, StageRunResultTyped, StageSignal, TypedStage};
use rig_engine::MeshEngine;
use serde_json::json;

use crate::engine_errors::FailureMap;
use crate::{AlignedMesh, PreparedMesh, Template};

const FAILURES: FailureMap = FailureMap { stage: "align",
                                          exit: RigError::Preprocess,
                                          missing: RigError::Preprocess };

fn align_error(err: AlignError) -> RigError {
    if err.is_degenerate_input() {
        RigError::DegenerateInput(err.to_string())
    } else {
        RigError::Numerical(err.to_string())
    }
}

/// Calcula la similitud que lleva la malla del template sobre la malla
/// canónica. No modifica el template compartido: la matriz viaja en el
/// artifact y el motor la aplica a su propia copia.
pub struct AlignStage {
    engine: Arc<dyn MeshEngine>,
    template: Arc<Template>,
    aligner: RigidAligner,
}

impl AlignStage {
    pub fn new(engine: Arc<dyn MeshEngine>, template: Arc<Template>) -> Self {
        Self { engine,
               template,
               aligner: RigidAligner::new() }
    }

    fn align(&self, input: &PreparedMesh) -> Result<(AlignedMesh, StageSignal), RigError> {
        let coords = self.engine.export_points(&input.path).map_err(|e| FAILURES.map(e))?;
        let target = PointSet::from(coords);
        let transform = self.aligner
                            .align(self.template.points(), &target)
                            .map_err(align_error)?;

        let aligned = AlignedMesh { mesh: input.path.clone(),
                                    matrix: transform.to_rows(),
                                    scale: transform.scale(),
                                    template_points: self.template.points().len(),
                                    mesh_points: target.len() };
        let signal = StageSignal { signal: "ALIGNMENT_COMPUTED".into(),
                                   data: json!({
                                       "scale": aligned.scale,
                                       "template_points": aligned.template_points,
                                       "mesh_points": aligned.mesh_points,
                                   }) };
        Ok((aligned, signal))
    }
}

impl fmt::Debug for AlignStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignStage")
         .field("template", &self.template.path())
         .finish_non_exhaustive()
    }
}

impl TypedStage for AlignStage {
    type Params = ();
    type Input = PreparedMesh;
    type Output = AlignedMesh;

    fn id(&self) -> &'static str {
        "align"
    }

    fn kind(&self) -> StageKind {
        StageKind::Align
    }

    fn run_typed(&self, input: PreparedMesh, _p: (), ctx: &StageContext) -> StageRunResultTyped<AlignedMesh> {
        match self.align(&input) {
            Ok((output, signal)) => {
                info!("job {}: template aligned (scale {:.4}, {} -> {} points)",
                      ctx.job_id,
                      output.scale,
                      output.template_points,
                      output.mesh_points);
                StageRunResultTyped::SuccessWithSignals { output,
                                                          signals: vec![signal] }
            }
            Err(error) => StageRunResultTyped::Failure { error },
        }
    }
}
