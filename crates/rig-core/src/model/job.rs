//! Registro de un job asíncrono y su máquina de estados.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ArtifactLocator;

/// Identificador opaco y único de un job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Estado de un job.
///
/// Las transiciones válidas son:
/// - `Queued` -> `Running`
/// - `Running` -> `Succeeded`
/// - `Running` -> `Failed`
///
/// `Succeeded` y `Failed` son terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!((self, next),
                 (JobStatus::Queued, JobStatus::Running)
                 | (JobStatus::Running, JobStatus::Succeeded)
                 | (JobStatus::Running, JobStatus::Failed))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "Queued",
            JobStatus::Running => "Running",
            JobStatus::Succeeded => "Succeeded",
            JobStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Código del error (`RiggingError`, `TimeoutError`, ...) si `Failed`.
    pub error_code: Option<String>,
    /// Causa legible (incluye extracto de stderr) si `Failed`.
    pub error_detail: Option<String>,
    pub result: Option<ArtifactLocator>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub(crate) fn queued(id: JobId) -> Self {
        let now = Utc::now();
        Self { id,
               status: JobStatus::Queued,
               error_code: None,
               error_detail: None,
               result: None,
               submitted_at: now,
               updated_at: now }
    }
}
