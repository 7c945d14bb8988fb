//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y arma una estructura inmutable con las
//! secciones de motor, almacenamiento, uploads y template.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use rig_core::model::normalize_extension;
use rig_engine::{EngineConfig, ScriptBundle};
use rig_persistence::{init_dotenv, StorageConfig};

use crate::errors::{CoreError, DomainError};

/// Template por defecto, relativo al directorio de trabajo.
pub const DEFAULT_TEMPLATE: &str = "templates/human.glb";

/// Límites aplicados a un upload antes de aceptarlo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: usize,
    /// Extensiones aceptadas, en minúsculas y sin punto.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self { max_bytes: 50 * 1024 * 1024,
               allowed_extensions: ["glb", "gltf", "obj", "fbx"].iter().map(|e| e.to_string()).collect() }
    }
}

impl UploadLimits {
    /// Valida forma, tipo y tamaño y devuelve la extensión normalizada (la
    /// misma que usará el job). Se compara sin distinguir mayúsculas y admite
    /// espacios y un punto inicial.
    pub fn check(&self, bytes: &[u8], extension: &str) -> Result<String, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::EmptyUpload);
        }
        let ext = normalize_extension(extension);
        if ext.is_empty() {
            return Err(DomainError::MissingExtension);
        }
        if !self.allowed_extensions.iter().any(|a| *a == ext) {
            return Err(DomainError::UnsupportedExtension(ext));
        }
        if bytes.len() > self.max_bytes {
            return Err(DomainError::TooLarge { size: bytes.len(),
                                               limit: self.max_bytes });
        }
        Ok(ext)
    }
}

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub uploads: UploadLimits,
    pub template_path: PathBuf,
}

impl AppConfig {
    /// Lee `.env` (una sola vez) y las variables `RIG_*` del proceso,
    /// incluidas las de storage (`RIG_CACHE_DIR`, `RIG_SCRATCH_DIR`,
    /// `RIG_EVENTS_DIR`).
    pub fn from_env() -> Result<Self, CoreError> {
        init_dotenv();
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        config.storage = StorageConfig::from_env();
        Ok(config)
    }

    /// Arma motor, uploads y template con una fuente de variables
    /// arbitraria; el storage queda en sus defaults. Valores vacíos cuentan
    /// como ausentes; valores numéricos inválidos son `CoreError::Config`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: Duration| -> Result<Duration, CoreError> {
            match var(key) {
                None => Ok(default),
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(0) => Err(CoreError::Config(format!("{key}: ceiling must be positive"))),
                    Ok(n) => Ok(Duration::from_secs(n)),
                    Err(e) => Err(CoreError::Config(format!("{key}: {e}"))),
                },
            }
        };

        let mut engine = EngineConfig::default();
        if let Some(bin) = var("RIG_ENGINE_BIN") {
            engine.binary = PathBuf::from(bin);
        }
        if let Some(dir) = var("RIG_SCRIPTS_DIR") {
            engine.scripts = ScriptBundle::at(dir);
        }
        engine.limits.prepare = secs("RIG_PREPARE_TIMEOUT_SECS", engine.limits.prepare)?;
        engine.limits.rig = secs("RIG_RIG_TIMEOUT_SECS", engine.limits.rig)?;
        engine.limits.export = secs("RIG_EXPORT_TIMEOUT_SECS", engine.limits.export)?;

        let mut uploads = UploadLimits::default();
        if let Some(raw) = var("RIG_MAX_UPLOAD_BYTES") {
            uploads.max_bytes = raw.trim()
                                   .parse()
                                   .map_err(|e| CoreError::Config(format!("RIG_MAX_UPLOAD_BYTES: {e}")))?;
        }

        Ok(Self { engine,
                  storage: StorageConfig::default(),
                  uploads,
                  template_path: var("RIG_TEMPLATE_PATH").map(PathBuf::from)
                                                         .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE)) })
    }
}
