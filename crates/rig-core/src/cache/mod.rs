//! Cache direccionada por contenido.
//!
//! `ContentCache` mapea el fingerprint de los bytes subidos al artifact ya
//! producido. Las implementaciones deben publicar de forma atómica: un
//! `lookup` concurrente ve el artifact anterior completo o el nuevo completo,
//! nunca un archivo a medio escribir.
//!
//! `CacheClaims` serializa corridas concurrentes del mismo contenido: la
//! segunda espera a la primera y vuelve a consultar la cache.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;

use crate::errors::RigError;
use crate::model::{ArtifactLocator, Fingerprint};

pub trait ContentCache: Send + Sync {
    /// Devuelve el artifact publicado para `fingerprint`, si existe.
    fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<ArtifactLocator>, RigError>;

    /// Publica el archivo `staged` bajo `fingerprint` y devuelve su locator
    /// definitivo. Idempotente: republicar el mismo fingerprint reemplaza el
    /// artifact completo (last write wins).
    fn publish(&self, fingerprint: &Fingerprint, staged: &Path) -> Result<ArtifactLocator, RigError>;
}

/// Claims por fingerprint para corridas en vuelo.
#[derive(Default)]
pub struct CacheClaims {
    locks: DashMap<Fingerprint, Arc<Mutex<()>>>,
}

/// Guard de un claim; libera el fingerprint al soltarse.
pub struct ClaimGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl CacheClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock compartido para el fingerprint (se crea al primer uso).
    pub fn slot(&self, fingerprint: &Fingerprint) -> Arc<Mutex<()>> {
        self.locks
            .entry(fingerprint.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    /// Bloquea hasta obtener el claim del slot. Un slot envenenado por un
    /// worker que entró en pánico se recupera igual: el `()` no guarda estado.
    pub fn acquire(slot: &Mutex<()>) -> ClaimGuard<'_> {
        let guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ClaimGuard { _guard: guard }
    }

    /// Elimina el slot cuando ya nadie lo comparte.
    pub fn release(&self, fingerprint: &Fingerprint) {
        self.locks.remove_if(fingerprint, |_, slot| Arc::strong_count(slot) <= 1);
    }

    pub fn in_flight(&self) -> usize {
        self.locks.len()
    }
}
