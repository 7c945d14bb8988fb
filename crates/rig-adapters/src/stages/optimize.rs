use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rig_core::{DeliveredAsset, RigError, StageContext, StageKind, StageRunResultTyped, TypedStage};

use crate::RiggedMesh;

/// Post-proceso de entrega (compresión, normalización de formato...).
pub trait Optimizer: Send + Sync {
    fn id(&self) -> &'static str;

    /// Lee `input` y escribe el resultado en `output`.
    fn optimize(&self, input: &Path, output: &Path) -> Result<(), RigError>;
}

/// Copia sin cambios.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityOptimizer;

impl Optimizer for IdentityOptimizer {
    fn id(&self) -> &'static str {
        "identity"
    }

    fn optimize(&self, input: &Path, output: &Path) -> Result<(), RigError> {
        std::fs::copy(input, output)?;
        Ok(())
    }
}

pub struct OptimizeStage {
    optimizer: Arc<dyn Optimizer>,
}

impl OptimizeStage {
    pub fn new(optimizer: Arc<dyn Optimizer>) -> Self {
        Self { optimizer }
    }
}

impl fmt::Debug for OptimizeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizeStage")
         .field("optimizer", &self.optimizer.id())
         .finish()
    }
}

impl TypedStage for OptimizeStage {
    /// El id del optimizer entra en el fingerprint del stage.
    type Params = String;
    type Input = RiggedMesh;
    type Output = DeliveredAsset;

    fn id(&self) -> &'static str {
        "optimize"
    }

    fn kind(&self) -> StageKind {
        StageKind::Optimize
    }

    fn params_default(&self) -> String {
        self.optimizer.id().to_string()
    }

    fn run_typed(&self, input: RiggedMesh, _p: String, ctx: &StageContext) -> StageRunResultTyped<DeliveredAsset> {
        let output = ctx.scratch_path("final.glb");
        self.optimizer
            .optimize(&input.path, &output)
            .map(|_| DeliveredAsset { path: output })
            .into()
    }
}
