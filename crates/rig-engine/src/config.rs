use std::path::PathBuf;
use std::time::Duration;

use crate::mesh_engine::EngineOp;
use crate::scripts::ScriptBundle;

/// Techos de duración por operación.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageLimits {
    /// prepare y convert-template
    pub prepare: Duration,
    pub rig: Duration,
    /// inspect y export-points
    pub export: Duration,
}

impl StageLimits {
    pub fn for_op(&self, op: EngineOp) -> Duration {
        match op {
            EngineOp::Prepare | EngineOp::ConvertTemplate => self.prepare,
            EngineOp::Rig => self.rig,
            EngineOp::Inspect | EngineOp::ExportPoints => self.export,
        }
    }
}

impl Default for StageLimits {
    fn default() -> Self {
        Self { prepare: Duration::from_secs(300),
               rig: Duration::from_secs(600),
               export: Duration::from_secs(120) }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Ejecutable del motor (se resuelve por PATH si es relativo).
    pub binary: PathBuf,
    pub scripts: ScriptBundle,
    pub limits: StageLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { binary: PathBuf::from("blender"),
               scripts: ScriptBundle::bundled(),
               limits: StageLimits::default() }
    }
}
