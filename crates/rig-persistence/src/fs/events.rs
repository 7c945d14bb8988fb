//! Event log append-only en archivos JSONL (`<dir>/<job_id>.jsonl`).
//!
//! El contrato de `EventStore` no es falible: si la escritura falla el
//! evento se registra con `warn!` y se devuelve igual; el log es diagnóstico
//! de operador y no decide el estado del job.
//!
//! El contador de seq por job vive en memoria sólo mientras la corrida está
//! abierta; al cerrarse se descarta y un append posterior lo reconstruye
//! desde el archivo.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use dashmap::DashMap;
use log::warn;
use rig_core::{EventStore, JobId, PipelineEvent, PipelineEventKind};

use crate::PersistenceError;

#[derive(Debug)]
pub struct FsEventStore {
    dir: PathBuf,
    next_seq: DashMap<JobId, u64>,
}

impl FsEventStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
        Ok(Self { dir,
                  next_seq: DashMap::new() })
    }

    /// Jobs con corrida abierta (contador de seq en memoria).
    pub fn open_runs(&self) -> usize {
        self.next_seq.len()
    }

    fn log_path(&self, job_id: JobId) -> PathBuf {
        self.dir.join(format!("{job_id}.jsonl"))
    }

    fn read_all(path: &Path) -> Vec<PipelineEvent> {
        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };
        BufReader::new(file).lines()
                            .map_while(Result::ok)
                            .filter_map(|line| match serde_json::from_str(&line) {
                                Ok(ev) => Some(ev),
                                Err(e) => {
                                    warn!("skipping corrupt event line in {}: {e}", path.display());
                                    None
                                }
                            })
                            .collect()
    }

    fn write_line(path: &Path, ev: &PipelineEvent) -> std::io::Result<()> {
        let line = serde_json::to_string(ev)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")
    }
}

impl EventStore for FsEventStore {
    fn append_kind(&self, job_id: JobId, kind: PipelineEventKind) -> PipelineEvent {
        let path = self.log_path(job_id);
        let ev = {
            // el RefMut mantiene el shard bloqueado durante la escritura
            let mut seq = self.next_seq
                              .entry(job_id)
                              .or_insert_with(|| Self::read_all(&path).len() as u64);
            let ev = PipelineEvent { seq: *seq,
                                     job_id,
                                     kind,
                                     ts: Utc::now() };
            *seq += 1;
            if let Err(e) = Self::write_line(&path, &ev) {
                warn!("failed to append event {} for job {job_id}: {e}", ev.seq);
            }
            ev
        };
        if ev.kind.closes_run() {
            self.next_seq.remove(&job_id);
        }
        ev
    }

    fn list(&self, job_id: JobId) -> Vec<PipelineEvent> {
        Self::read_all(&self.log_path(job_id))
    }
}
