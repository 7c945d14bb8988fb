use chrono::Utc;
use dashmap::DashMap;

use super::{PipelineEvent, PipelineEventKind};
use crate::model::JobId;

/// Almacenamiento de eventos append-only, compartido entre workers.
pub trait EventStore: Send + Sync {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&self, job_id: JobId, kind: PipelineEventKind) -> PipelineEvent;
    /// Lista eventos de un job (orden ascendente por seq).
    fn list(&self, job_id: JobId) -> Vec<PipelineEvent>;
}

/// Permite elegir el backend en runtime (`Box<dyn EventStore>`).
impl<S: EventStore + ?Sized> EventStore for Box<S> {
    fn append_kind(&self, job_id: JobId, kind: PipelineEventKind) -> PipelineEvent {
        (**self).append_kind(job_id, kind)
    }

    fn list(&self, job_id: JobId) -> Vec<PipelineEvent> {
        (**self).list(job_id)
    }
}

/// Log completo en memoria. Los eventos de cada job se retienen mientras
/// viva el proceso, igual que el registro de jobs; para historiales largos
/// se usa el backend de archivos.
#[derive(Default)]
pub struct InMemoryEventStore {
    inner: DashMap<JobId, Vec<PipelineEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&self, job_id: JobId, kind: PipelineEventKind) -> PipelineEvent {
        let mut vec = self.inner.entry(job_id).or_default();
        let seq = vec.len() as u64;
        let ev = PipelineEvent { seq,
                                 job_id,
                                 kind,
                                 ts: Utc::now() };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, job_id: JobId) -> Vec<PipelineEvent> {
        self.inner.get(&job_id).map(|v| v.value().clone()).unwrap_or_default()
    }
}
