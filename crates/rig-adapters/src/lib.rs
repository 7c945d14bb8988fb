//! rig-adapters: pipeline concreto de auto-rigging sobre el core genérico.
//!
//! Este crate provee:
//! - Artifacts tipados que fluyen entre stages (`PreparedMesh`,
//!   `AlignedMesh`, `RiggedMesh`).
//! - `Template`: carga y validación del template (una armature + una malla).
//! - Los cuatro stages `Prepare → Align → DelegateRig → Optimize` y el
//!   trait `Optimizer` para post-proceso enchufable.
//! - `build_rig_pipeline`, que los encadena con `Pipe` verificando en
//!   compilación que cada input coincida con el output anterior.

pub mod artifacts;
pub mod engine_errors;
pub mod stages;
pub mod template;

pub use artifacts::{AlignedMesh, PreparedMesh, RiggedMesh};
pub use stages::{build_rig_pipeline, AlignStage, DelegateRigStage, IdentityOptimizer, OptimizeStage, Optimizer,
                 PrepareStage, RigParams};
pub use template::Template;
