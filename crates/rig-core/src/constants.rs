//! Constantes del motor de rigging.
//!
//! Agrupa valores estáticos que participan en el cálculo de fingerprints de
//! stage y en los límites de los mensajes de error devueltos al caller.

/// Versión lógica del pipeline. Forma parte del input de hashing de cada
/// stage, de modo que un cambio de versión invalida los fingerprints aunque
/// la definición y los datos no cambien.
pub const PIPELINE_VERSION: &str = "R1.0";

/// Máximo de bytes de stderr que se adjuntan al registro de fallo de un job.
/// El stderr completo sólo va al log del operador.
pub const STDERR_EXCERPT_LIMIT: usize = 2048;

/// Nombre sugerido para la descarga del artifact final.
pub const DOWNLOAD_NAME: &str = "rigged.glb";

/// Extensión con la que se publica cada artifact en la store de contenido.
pub const ARTIFACT_EXTENSION: &str = "glb";
