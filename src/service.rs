//! Fachada del servicio: validación de uploads, scheduling de workers,
//! consulta de estado y descarga del artifact.
//!
//! `submit` valida de forma síncrona (un upload inválido nunca crea un job)
//! y delega la corrida a un worker bloqueante de tokio. El worker es el
//! único que avanza el estado del job en el `TaskRegistry`; los pollers sólo
//! leen copias.

use std::fs;
use std::sync::Arc;

use log::{error, info, warn};
use rig_adapters::{build_rig_pipeline, IdentityOptimizer, Optimizer, Template};
use rig_core::constants::DOWNLOAD_NAME;
use rig_core::{ArtifactLocator, CoordinatorBuilder, EventStore, InMemoryEventStore, InputAsset, Job, JobId, JobStatus,
               PipelineCoordinator, PipelineDefinition, PipelineEvent, RigError, TaskRegistry};
use rig_engine::{BlenderEngine, MeshEngine};
use rig_persistence::{FsContentCache, FsEventStore};
use tokio::runtime::Handle;

use crate::config::AppConfig;
use crate::errors::CoreError;

type Coordinator = PipelineCoordinator<Box<dyn EventStore>>;

pub struct RigService {
    config: AppConfig,
    registry: Arc<TaskRegistry>,
    coordinator: Arc<Coordinator>,
    pipeline: Arc<PipelineDefinition>,
    runtime: Handle,
}

impl RigService {
    /// Arranca con el motor headless configurado.
    pub fn start(config: AppConfig, runtime: Handle) -> Result<Self, CoreError> {
        let engine = Arc::new(BlenderEngine::new(config.engine.clone()));
        Self::with_engine(config, engine, Arc::new(IdentityOptimizer), runtime)
    }

    /// Carga el template, abre el storage y arma el pipeline sobre `engine`.
    pub fn with_engine(config: AppConfig,
                       engine: Arc<dyn MeshEngine>,
                       optimizer: Arc<dyn Optimizer>,
                       runtime: Handle)
                       -> Result<Self, CoreError> {
        let template = Template::load(engine.as_ref(), &config.template_path)?;
        let cache = FsContentCache::open(&config.storage.cache_dir)?;
        fs::create_dir_all(&config.storage.scratch_dir)?;
        let events: Box<dyn EventStore> = match &config.storage.events_dir {
            Some(dir) => Box::new(FsEventStore::open(dir)?),
            None => Box::new(InMemoryEventStore::default()),
        };
        let coordinator = CoordinatorBuilder::new(Arc::new(cache)).event_store(events)
                                                                  .scratch_root(&config.storage.scratch_dir)
                                                                  .build();
        let pipeline = build_rig_pipeline(engine, Arc::new(template), optimizer);
        info!("rig service ready: template {}, cache {}, {} stages",
              config.template_path.display(),
              config.storage.cache_dir.display(),
              pipeline.len());
        Ok(Self { config,
                  registry: Arc::new(TaskRegistry::new()),
                  coordinator: Arc::new(coordinator),
                  pipeline: Arc::new(pipeline),
                  runtime })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Valida el upload, crea el job (`Queued`) y agenda su corrida.
    pub fn submit(&self, bytes: Vec<u8>, extension: &str) -> Result<JobId, RigError> {
        let extension = self.config.uploads.check(&bytes, extension)?;
        let asset = InputAsset::new(bytes, &extension);
        let id = self.registry.submit();
        info!("job {id}: accepted {} bytes (.{}) fingerprint {}",
              asset.len(),
              asset.extension(),
              asset.fingerprint());

        let registry = self.registry.clone();
        let coordinator = self.coordinator.clone();
        let pipeline = self.pipeline.clone();
        let worker_registry = registry.clone();
        self.runtime.spawn(async move {
                        let worker = tokio::task::spawn_blocking(move || {
                            run_job(&worker_registry, &coordinator, &pipeline, id, &asset)
                        });
                        if let Err(join) = worker.await {
                            error!("job {id}: worker aborted: {join}");
                            let err = RigError::Internal("worker aborted".into());
                            if let Err(e) = registry.mark_failed(id, &err) {
                                warn!("job {id}: could not record abort: {e}");
                            }
                        }
                    });
        Ok(id)
    }

    /// `NotFound` si el id nunca fue emitido.
    pub fn status(&self, id: JobId) -> Result<Job, RigError> {
        self.registry.get_status(id)
    }

    /// Bytes del artifact de un job `Succeeded` y el nombre sugerido para
    /// la descarga.
    pub fn download(&self, id: JobId) -> Result<(Vec<u8>, &'static str), RigError> {
        let job = self.registry.get_status(id)?;
        let locator = match (job.status, job.result) {
            (JobStatus::Succeeded, Some(locator)) => locator,
            (JobStatus::Succeeded, None) => {
                return Err(RigError::Consistency(format!("job {id} succeeded without an artifact")));
            }
            (status, _) => return Err(RigError::NotFound(format!("artifact for job {id} (status {status})"))),
        };
        match fs::read(locator.path()) {
            Ok(bytes) => Ok((bytes, DOWNLOAD_NAME)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                error!("job {id}: artifact {locator} is gone from storage");
                Err(RigError::Consistency(format!("artifact for succeeded job {id} is missing from storage")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Event log de la corrida, para diagnóstico del operador.
    pub fn events(&self, id: JobId) -> Vec<PipelineEvent> {
        self.coordinator.events_for(id)
    }
}

fn run_job(registry: &TaskRegistry,
           coordinator: &Coordinator,
           pipeline: &PipelineDefinition,
           id: JobId,
           asset: &InputAsset) {
    if let Err(e) = registry.mark_running(id) {
        warn!("job {id}: not started: {e}");
        return;
    }
    let recorded = match coordinator.run(id, asset, pipeline) {
        Ok(locator) => succeed(registry, id, locator),
        Err(err) => {
            error!("job {id}: failed: {}", err.summary());
            registry.mark_failed(id, &err)
        }
    };
    if let Err(e) = recorded {
        warn!("job {id}: {e}");
    }
}

fn succeed(registry: &TaskRegistry, id: JobId, locator: ArtifactLocator) -> Result<(), RigError> {
    info!("job {id}: succeeded -> {locator}");
    registry.mark_succeeded(id, locator)
}
