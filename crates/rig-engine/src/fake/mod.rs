//! Motor en memoria para tests.
//!
//! Trabaja sobre un formato de escena de texto compatible con OBJ (ver
//! [`FakeScene`]) y permite configurar por operación si tiene éxito, falla
//! con stderr, termina sin escribir la salida o se cuelga hasta su techo.

mod fixtures;
mod scene;

pub use fixtures::{cube_obj, icosphere, template_scene};
pub use scene::{FakeMesh, FakeScene};

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::{EngineError, EngineOp, MeshEngine, RigRequest, SceneSummary};

#[derive(Debug, Clone, PartialEq)]
pub enum FakeBehavior {
    Succeed,
    /// exit status 1 con este stderr
    Fail(String),
    /// exit status 0 sin archivo de salida
    NoOutput,
    /// no responde; se "mata" al vencer el techo indicado
    Stall(Duration),
}

#[derive(Debug, Default)]
pub struct FakeMeshEngine {
    behaviors: HashMap<EngineOp, FakeBehavior>,
    calls: [AtomicUsize; 5],
    rig_requests: Mutex<Vec<RigRequest>>,
}

fn slot(op: EngineOp) -> usize {
    match op {
        EngineOp::Prepare => 0,
        EngineOp::Inspect => 1,
        EngineOp::ExportPoints => 2,
        EngineOp::Rig => 3,
        EngineOp::ConvertTemplate => 4,
    }
}

impl FakeMeshEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, op: EngineOp, behavior: FakeBehavior) -> Self {
        self.behaviors.insert(op, behavior);
        self
    }

    pub fn calls(&self, op: EngineOp) -> usize {
        self.calls[slot(op)].load(Ordering::SeqCst)
    }

    /// Pedidos de rigging recibidos, en orden.
    pub fn rig_requests(&self) -> Vec<RigRequest> {
        self.rig_requests
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// Cuenta la llamada y aplica el comportamiento configurado. `Ok(false)`
    /// simula exit 0 sin salida: prepare y rig no escriben nada y el
    /// llamador debe detectarlo verificando el archivo.
    fn enter(&self, op: EngineOp) -> Result<bool, EngineError> {
        self.calls[slot(op)].fetch_add(1, Ordering::SeqCst);
        match self.behaviors.get(&op).unwrap_or(&FakeBehavior::Succeed) {
            FakeBehavior::Succeed => Ok(true),
            FakeBehavior::NoOutput => Ok(false),
            FakeBehavior::Fail(stderr) => Err(EngineError::NonZeroExit { operation: op,
                                                                         code: Some(1),
                                                                         stderr: stderr.clone() }),
            FakeBehavior::Stall(ceiling) => {
                thread::sleep(*ceiling);
                Err(EngineError::Timeout { operation: op,
                                           ceiling: *ceiling,
                                           stderr: String::new() })
            }
        }
    }

    fn read_scene(op: EngineOp, path: &Path) -> Result<FakeScene, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::NonZeroExit { operation: op,
                                                                                       code: Some(1),
                                                                                       stderr: format!("cannot read {}: {e}",
                                                                                                       path.display()) })?;
        FakeScene::parse(&text).map_err(|e| EngineError::NonZeroExit { operation: op,
                                                                       code: Some(1),
                                                                       stderr: e })
    }

    fn missing(op: EngineOp, path: &Path) -> EngineError {
        EngineError::MissingOutput { operation: op,
                                     path: path.display().to_string() }
    }

    fn script_error(op: EngineOp, msg: String) -> EngineError {
        EngineError::NonZeroExit { operation: op,
                                   code: Some(1),
                                   stderr: msg }
    }
}

impl MeshEngine for FakeMeshEngine {
    fn prepare(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        let op = EngineOp::Prepare;
        if !self.enter(op)? {
            return Ok(());
        }
        let scene = Self::read_scene(op, input)?;
        let joined = scene.joined().ok_or_else(|| Self::script_error(op, "input contains no mesh geometry".into()))?;
        std::fs::write(output, FakeScene::from_mesh(joined).render())?;
        Ok(())
    }

    fn inspect(&self, asset: &Path) -> Result<SceneSummary, EngineError> {
        let op = EngineOp::Inspect;
        if !self.enter(op)? {
            return Err(Self::missing(op, asset));
        }
        Ok(Self::read_scene(op, asset)?.summary())
    }

    fn export_points(&self, asset: &Path) -> Result<Vec<[f64; 3]>, EngineError> {
        let op = EngineOp::ExportPoints;
        if !self.enter(op)? {
            return Err(Self::missing(op, asset));
        }
        let scene = Self::read_scene(op, asset)?;
        Ok(scene.meshes.into_iter().flat_map(|m| m.vertices).collect())
    }

    fn rig(&self, request: &RigRequest) -> Result<(), EngineError> {
        let op = EngineOp::Rig;
        if let Ok(mut log) = self.rig_requests.lock() {
            log.push(request.clone());
        }
        if !self.enter(op)? {
            return Ok(());
        }
        let target = Self::read_scene(op, &request.input)?;
        let template = Self::read_scene(op, &request.template)?;
        let [mesh] = <[FakeMesh; 1]>::try_from(target.meshes).map_err(|m| {
                                                                Self::script_error(op,
                                                                                   format!("input: expected exactly one MESH, found {}", m.len()))
                                                            })?;
        if template.armatures.len() != 1 || template.meshes.len() != 1 {
            return Err(Self::script_error(op,
                                          format!("template: expected one ARMATURE and one MESH, found {} and {}",
                                                  template.armatures.len(),
                                                  template.meshes.len())));
        }
        let armature = template.armatures[0].clone();
        let rigged = FakeScene { parent: Some(armature.name.clone()),
                                 armatures: vec![armature],
                                 meshes: vec![mesh],
                                 transform: Some(request.matrix) };
        std::fs::write(&request.output, rigged.render())?;
        Ok(())
    }

    fn convert_template(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        let op = EngineOp::ConvertTemplate;
        if !self.enter(op)? {
            return Ok(());
        }
        let scene = Self::read_scene(op, input)?;
        if scene.armatures.is_empty() {
            return Err(Self::script_error(op, "template contains no armature".into()));
        }
        std::fs::write(output, scene.render())?;
        Ok(())
    }
}
