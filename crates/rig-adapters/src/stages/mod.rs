//! Stages del pipeline de rigging.

mod align;
mod delegate_rig;
mod optimize;
mod prepare;

pub use align::AlignStage;
pub use delegate_rig::{DelegateRigStage, RigParams};
pub use optimize::{IdentityOptimizer, OptimizeStage, Optimizer};
pub use prepare::PrepareStage;

use std::sync::Arc;

use rig_core::{Pipe, PipelineDefinition};
use rig_engine::MeshEngine;

use crate::Template;

/// Encadena `Prepare → Align → DelegateRig → Optimize`.
pub fn build_rig_pipeline(engine: Arc<dyn MeshEngine>,
                          template: Arc<Template>,
                          optimizer: Arc<dyn Optimizer>)
                          -> PipelineDefinition {
    Pipe::new(PrepareStage::new(engine.clone())).then(AlignStage::new(engine.clone(), template.clone()))
                                                .then(DelegateRigStage::new(engine, template))
                                                .then(OptimizeStage::new(optimizer))
                                                .build()
}
