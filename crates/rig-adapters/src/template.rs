//! Template de rigging: armature + malla de referencia con pesos.
//!
//! Se carga una vez a través del motor y se comparte (inmutable) entre
//! todos los jobs. La forma requerida es explícita: exactamente una
//! armature y exactamente una malla; cualquier otra cosa es
//! `ValidationError`, nunca "el primero de la lista".
//!
//! Los templates de origen suelen venir en FBX; `Template::convert` los
//! reexporta a GLB una vez (fuera del camino de los jobs) y valida el
//! resultado con la misma carga que usa el servicio.

use std::path::{Path, PathBuf};

use log::info;
use rig_align::PointSet;
use rig_core::RigError;
use rig_engine::{ArmatureInfo, MeshEngine, MeshInfo, SceneSummary};

use crate::engine_errors::FailureMap;

const LOAD_FAILURES: FailureMap = FailureMap { stage: "template",
                                               exit: RigError::Validation,
                                               missing: RigError::Validation };

const CONVERT_FAILURES: FailureMap = FailureMap { stage: "convert_template",
                                                  exit: RigError::Validation,
                                                  missing: RigError::MissingOutput };

#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    armature: ArmatureInfo,
    mesh: MeshInfo,
    points: PointSet,
}

impl Template {
    /// Inspecciona y valida el template, y captura los puntos de su malla.
    pub fn load(engine: &dyn MeshEngine, path: &Path) -> Result<Self, RigError> {
        if !path.is_file() {
            return Err(RigError::Validation(format!("template not found: {}", path.display())));
        }
        let summary = engine.inspect(path).map_err(|e| LOAD_FAILURES.map(e))?;
        let (armature, mesh) = Self::validate_shape(&summary)?;

        let coords = engine.export_points(path).map_err(|e| LOAD_FAILURES.map(e))?;
        if coords.is_empty() {
            return Err(RigError::Validation(format!("template mesh '{}' has no vertices", mesh.name)));
        }
        info!("template {} loaded: armature '{}' ({} bones), mesh '{}' ({} vertices)",
              path.display(),
              armature.name,
              armature.bones.len(),
              mesh.name,
              coords.len());
        Ok(Self { path: path.to_path_buf(),
                  armature,
                  mesh,
                  points: PointSet::from(coords) })
    }

    /// Convierte `source` (FBX o glTF) a GLB en `output` y carga el
    /// resultado; un GLB sin la forma requerida se rechaza igual que al
    /// arrancar el servicio.
    pub fn convert(engine: &dyn MeshEngine, source: &Path, output: &Path) -> Result<Self, RigError> {
        if !source.is_file() {
            return Err(RigError::Validation(format!("template source not found: {}", source.display())));
        }
        engine.convert_template(source, output)
              .map_err(|e| CONVERT_FAILURES.map(e))?;
        if !output.is_file() {
            return Err(RigError::MissingOutput(output.display().to_string()));
        }
        info!("template {} converted -> {}", source.display(), output.display());
        Self::load(engine, output)
    }

    /// Exige exactamente una armature y una malla.
    pub fn validate_shape(summary: &SceneSummary) -> Result<(ArmatureInfo, MeshInfo), RigError> {
        match (summary.armatures.as_slice(), summary.meshes.as_slice()) {
            ([armature], [mesh]) => Ok((armature.clone(), mesh.clone())),
            (armatures, meshes) => Err(RigError::Validation(format!(
                "template must contain exactly one armature and one mesh, found {} armature(s) and {} mesh(es)",
                armatures.len(),
                meshes.len()
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn armature(&self) -> &ArmatureInfo {
        &self.armature
    }

    pub fn mesh(&self) -> &MeshInfo {
        &self.mesh
    }

    /// Vértices en espacio mundo de la malla del template.
    pub fn points(&self) -> &PointSet {
        &self.points
    }
}
