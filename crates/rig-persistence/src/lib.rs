//! rig-persistence
//!
//! Almacenamiento en filesystem para el pipeline de rigging.
//!
//! Módulos:
//! - `fs`: store de artifacts direccionada por contenido (`FsContentCache`,
//!   publicación atómica) y event log JSONL por job (`FsEventStore`).
//! - `config`: rutas de almacenamiento desde `.env` / entorno.
//! - `error`: errores de persistencia y su traducción a `RigError`.

pub mod config;
pub mod error;
pub mod fs;

pub use config::{init_dotenv, StorageConfig};
pub use error::PersistenceError;
pub use fs::{FsContentCache, FsEventStore, StorageLayout};
