//! Contrato del motor de mallas.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Operaciones que el motor expone; nombran timeouts, logs y errores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineOp {
    Prepare,
    Inspect,
    ExportPoints,
    Rig,
    ConvertTemplate,
}

impl EngineOp {
    pub fn as_str(self) -> &'static str {
        match self {
            EngineOp::Prepare => "prepare",
            EngineOp::Inspect => "inspect",
            EngineOp::ExportPoints => "export-points",
            EngineOp::Rig => "rig",
            EngineOp::ConvertTemplate => "convert-template",
        }
    }
}

impl fmt::Display for EngineOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmatureInfo {
    pub name: String,
    pub bones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshInfo {
    pub name: String,
    pub vertex_count: usize,
}

/// Objetos de una escena importada.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneSummary {
    pub armatures: Vec<ArmatureInfo>,
    pub meshes: Vec<MeshInfo>,
}

/// Pedido de rigging: malla canónica + template + transformación de
/// alineación que el motor aplica al template antes de transferir pesos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigRequest {
    pub input: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
    /// Matriz homogénea 4×4 por filas.
    pub matrix: [[f64; 4]; 4],
    pub smooth_iterations: u32,
    pub smooth_factor: f64,
}

/// Capacidad de manipulación de mallas que los stages reciben inyectada.
///
/// Todas las operaciones bloquean el hilo llamador hasta que el motor
/// termina o vence el techo de la operación.
pub trait MeshEngine: Send + Sync + fmt::Debug {
    /// Normaliza el asset subido (triangula, aplica transformaciones, une
    /// en una malla) y escribe la malla canónica en `output`.
    fn prepare(&self, input: &Path, output: &Path) -> Result<(), EngineError>;

    /// Resumen de armatures y mallas de un archivo de escena.
    fn inspect(&self, asset: &Path) -> Result<SceneSummary, EngineError>;

    /// Vértices en espacio mundo de todas las mallas del archivo.
    fn export_points(&self, asset: &Path) -> Result<Vec<[f64; 3]>, EngineError>;

    /// Transfiere pesos, suaviza, enlaza la armature y exporta a `request.output`.
    fn rig(&self, request: &RigRequest) -> Result<(), EngineError>;

    /// Reexporta un template rigueado (FBX o glTF) como GLB en `output`
    /// conservando armature y pesos.
    fn convert_template(&self, input: &Path, output: &Path) -> Result<(), EngineError>;
}
