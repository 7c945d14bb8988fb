//! Scripts versionados del motor.
//!
//! Los scripts viven en `scripts/` junto al crate y se referencian por ruta;
//! nunca se escriben por invocación. Para despliegues sin el árbol fuente,
//! `ScriptBundle::install` materializa una única vez las copias embebidas.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineScript {
    Prepare,
    Inspect,
    ExportPoints,
    Rig,
    ConvertTemplate,
}

impl EngineScript {
    pub const ALL: [EngineScript; 5] = [EngineScript::Prepare,
                                        EngineScript::Inspect,
                                        EngineScript::ExportPoints,
                                        EngineScript::Rig,
                                        EngineScript::ConvertTemplate];

    pub fn file_name(self) -> &'static str {
        match self {
            EngineScript::Prepare => "prepare_v1.py",
            EngineScript::Inspect => "inspect_v1.py",
            EngineScript::ExportPoints => "export_points_v1.py",
            EngineScript::Rig => "rig_v1.py",
            EngineScript::ConvertTemplate => "convert_template_v1.py",
        }
    }

    /// Contenido embebido en el binario.
    pub fn source(self) -> &'static str {
        match self {
            EngineScript::Prepare => include_str!("../scripts/prepare_v1.py"),
            EngineScript::Inspect => include_str!("../scripts/inspect_v1.py"),
            EngineScript::ExportPoints => include_str!("../scripts/export_points_v1.py"),
            EngineScript::Rig => include_str!("../scripts/rig_v1.py"),
            EngineScript::ConvertTemplate => include_str!("../scripts/convert_template_v1.py"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBundle {
    dir: PathBuf,
}

impl ScriptBundle {
    /// Directorio `scripts/` del crate.
    pub fn bundled() -> Self {
        Self { dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts") }
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Escribe las copias embebidas en `dir` (sólo las ausentes o distintas).
    pub fn install(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        for script in EngineScript::ALL {
            let path = dir.join(script.file_name());
            let current = fs::read_to_string(&path).ok();
            if current.as_deref() != Some(script.source()) {
                fs::write(&path, script.source())?;
            }
        }
        Ok(Self::at(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, script: EngineScript) -> PathBuf {
        self.dir.join(script.file_name())
    }

    /// Scripts que faltan en el directorio.
    pub fn missing(&self) -> Vec<PathBuf> {
        EngineScript::ALL.iter()
                         .map(|s| self.path(*s))
                         .filter(|p| !p.is_file())
                         .collect()
    }
}
