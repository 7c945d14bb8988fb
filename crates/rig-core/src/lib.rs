//! rig-core: coordinador lineal y determinista del pipeline de auto-rigging.
//!
//! Contiene los modelos neutrales (artifacts, fingerprints, jobs), el
//! contrato de stages tipados, el event log append-only, el registro de
//! tareas y el `PipelineCoordinator`. No conoce motores de mallas ni
//! algoritmos de alineación: esos viven en crates adaptadores.
pub mod cache;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod registry;
pub mod repo;
pub mod stage;

pub use cache::{CacheClaims, ContentCache};
pub use engine::{CoordinatorBuilder, PipelineCoordinator};
pub use errors::RigError;
pub use event::{EventStore, InMemoryEventStore, PipelineEvent, PipelineEventKind};
pub use model::{Artifact, ArtifactKind, ArtifactLocator, ArtifactSpec, DeliveredAsset, Fingerprint, InputAsset, Job,
                JobId, JobStatus, StageContext, UploadedAsset};
pub use registry::TaskRegistry;
pub use repo::{build_pipeline_definition, InMemoryRunRepository, PipelineDefinition, RunInstance, RunRepository};
pub use stage::{Pipe, SameAs, StageDefinition, StageKind, StageRunResult, StageRunResultTyped, StageSignal, StageStatus,
                TypedStage};
