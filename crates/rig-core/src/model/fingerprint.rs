use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hashing::sha256_hex;

/// Fingerprint de contenido: SHA-256 hex de los bytes subidos. Bytes
/// idénticos producen el mismo fingerprint sin importar nombre ni fecha.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(sha256_hex(bytes))
    }

    /// Reconstruye un fingerprint desde su forma hex (p. ej. un nombre de
    /// archivo en la store). Devuelve `None` si no son 64 dígitos hex.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let valid = hex.len() == 64 && hex.bytes().all(|b| b.is_ascii_hexdigit());
        valid.then(|| Self(hex.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insumos para calcular el fingerprint de un stage.
/// NO es el fingerprint final (string hash) sino el modelo previo a canonicalizar.
#[derive(Serialize)]
pub struct StageFingerprintInput<'a> {
    pub pipeline_version: &'a str,
    pub definition_hash: &'a str,
    pub stage_index: usize,
    pub stage_id: &'a str,
    pub input_hash: &'a str,
    pub output_hashes: &'a [String],
    pub params: &'a Value,
}
