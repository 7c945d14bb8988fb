//! Registro de jobs para polling asíncrono.
//!
//! Dueño exclusivo de los `Job`: los workers sólo avanzan el estado mediante
//! `mark_*` y los pollers leen copias con `get_status`. Cada entrada se
//! actualiza bajo el lock de su shard, por lo que check-and-set es atómico
//! frente a lecturas concurrentes.

use chrono::Utc;
use dashmap::DashMap;
use log::warn;

use crate::errors::RigError;
use crate::model::{ArtifactLocator, Job, JobId, JobStatus};

#[derive(Debug, Default)]
pub struct TaskRegistry {
    jobs: DashMap<JobId, Job>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crea un job en estado `Queued`.
    pub fn submit(&self) -> JobId {
        let id = JobId::new();
        self.jobs.insert(id, Job::queued(id));
        id
    }

    pub fn mark_running(&self, id: JobId) -> Result<(), RigError> {
        self.transition(id, JobStatus::Running, |_| {})
    }

    pub fn mark_succeeded(&self, id: JobId, locator: ArtifactLocator) -> Result<(), RigError> {
        self.transition(id, JobStatus::Succeeded, |job| job.result = Some(locator))
    }

    /// Marca el job como fallido guardando el código y el resumen del error.
    pub fn mark_failed(&self, id: JobId, error: &RigError) -> Result<(), RigError> {
        self.transition(id, JobStatus::Failed, |job| {
                job.error_code = Some(error.code().to_string());
                job.error_detail = Some(error.to_string());
            })
    }

    /// Copia del registro; `NotFound` si el id nunca existió.
    pub fn get_status(&self, id: JobId) -> Result<Job, RigError> {
        self.jobs
            .get(&id)
            .map(|j| j.value().clone())
            .ok_or_else(|| RigError::NotFound(format!("job {id}")))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Cantidad de jobs en un estado dado.
    pub fn count(&self, status: JobStatus) -> usize {
        self.jobs.iter().filter(|j| j.status == status).count()
    }

    fn transition<F>(&self, id: JobId, next: JobStatus, apply: F) -> Result<(), RigError>
        where F: FnOnce(&mut Job)
    {
        let mut entry = self.jobs
                            .get_mut(&id)
                            .ok_or_else(|| RigError::NotFound(format!("job {id}")))?;
        let job = entry.value_mut();
        if !job.status.can_transition_to(next) {
            warn!("job {id}: rejected transition {} -> {next}", job.status);
            return Err(RigError::InvalidTransition { from: job.status.to_string(),
                                                     to: next.to_string() });
        }
        job.status = next;
        job.updated_at = Utc::now();
        apply(job);
        Ok(())
    }
}
