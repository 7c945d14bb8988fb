//! Carga de configuración de almacenamiento desde variables de entorno.
//! Variables: `RIG_CACHE_DIR`, `RIG_SCRATCH_DIR`, `RIG_EVENTS_DIR`.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directorio de artifacts publicados (`<fingerprint>.glb`).
    pub cache_dir: PathBuf,
    /// Raíz bajo la cual cada corrida crea su workspace efímero.
    pub scratch_dir: PathBuf,
    /// Event log persistente; `None` deja los eventos en memoria.
    pub events_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { cache_dir: PathBuf::from("outputs"),
               scratch_dir: env::temp_dir(),
               events_dir: None }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl StorageConfig {
    pub fn from_env() -> Self {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let defaults = Self::default();
        Self { cache_dir: non_empty("RIG_CACHE_DIR").map(PathBuf::from)
                                                    .unwrap_or(defaults.cache_dir),
               scratch_dir: non_empty("RIG_SCRATCH_DIR").map(PathBuf::from)
                                                        .unwrap_or(defaults.scratch_dir),
               events_dir: non_empty("RIG_EVENTS_DIR").map(PathBuf::from) }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
