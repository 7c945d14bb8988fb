//! Hash helpers.
//!
//! - `hash_str` / `hash_value`: blake3 sobre JSON canónico; identidad interna
//!   de artifacts, definiciones y fingerprints de stage.
//! - `sha256_hex`: fingerprint de contenido de los uploads (clave de la cache).

use blake3::Hasher;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::to_canonical_json;

/// Hashea un string y devuelve hex.
pub fn hash_str(input: &str) -> String {
    let mut h = Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Hashea un `Value` tras canonicalizarlo.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

/// SHA-256 de bytes crudos en hex (64 caracteres).
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
