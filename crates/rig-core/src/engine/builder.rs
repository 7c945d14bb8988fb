//! Builder para `PipelineCoordinator`.
//!
//! La cache es obligatoria (se pasa al crear el builder); el event store y
//! el directorio scratch tienen defaults (`InMemoryEventStore`, directorio
//! temporal del sistema).
//!
//! ```ignore
//! let coordinator = CoordinatorBuilder::new(cache)
//!     .scratch_root("/var/tmp/autorig")
//!     .build();
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::ContentCache;
use crate::engine::PipelineCoordinator;
use crate::event::{EventStore, InMemoryEventStore};

pub struct CoordinatorBuilder<E: EventStore> {
    event_store: E,
    cache: Arc<dyn ContentCache>,
    scratch_root: Option<PathBuf>,
}

impl CoordinatorBuilder<InMemoryEventStore> {
    pub fn new(cache: Arc<dyn ContentCache>) -> Self {
        Self { event_store: InMemoryEventStore::default(),
               cache,
               scratch_root: None }
    }
}

impl<E: EventStore> CoordinatorBuilder<E> {
    /// Reemplaza el event store (cambia el parámetro de tipo del builder).
    pub fn event_store<E2: EventStore>(self, event_store: E2) -> CoordinatorBuilder<E2> {
        CoordinatorBuilder { event_store,
                             cache: self.cache,
                             scratch_root: self.scratch_root }
    }

    /// Directorio bajo el cual cada corrida crea su workspace efímero.
    pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn build(self) -> PipelineCoordinator<E> {
        let scratch_root = self.scratch_root.unwrap_or_else(std::env::temp_dir);
        PipelineCoordinator::new(self.event_store, self.cache, scratch_root)
    }
}
