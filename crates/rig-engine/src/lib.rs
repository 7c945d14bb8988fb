//! rig-engine: frontera con el motor de mallas externo.
//!
//! El motor se invoca como subproceso headless con duración acotada:
//! `<engine> --background --python <script> -- <args...>`. El éxito exige
//! exit status cero **y** que exista el archivo de salida declarado; de
//! stderr se conserva la cola (`process::CAPTURE_LIMIT` bytes) para el
//! diagnóstico.
//!
//! `MeshEngine` es la capacidad inyectada en los stages; `BlenderEngine` la
//! implementa con los scripts versionados de `scripts/` y `FakeMeshEngine`
//! la simula en memoria para tests (feature `fake`).

pub mod blender;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod mesh_engine;
pub mod process;
pub mod scripts;

pub use blender::BlenderEngine;
pub use config::{EngineConfig, StageLimits};
pub use error::EngineError;
#[cfg(any(test, feature = "fake"))]
pub use fake::{FakeBehavior, FakeMeshEngine};
pub use mesh_engine::{ArmatureInfo, EngineOp, MeshEngine, MeshInfo, RigRequest, SceneSummary};
pub use scripts::{EngineScript, ScriptBundle};
