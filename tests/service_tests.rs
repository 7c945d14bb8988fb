use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use autorig::{AppConfig, CoreError, RigService};
use rig_adapters::IdentityOptimizer;
use rig_core::{Job, JobId, JobStatus, PipelineEventKind, RigError};
use rig_engine::fake::{cube_obj, template_scene, FakeScene};
use rig_engine::{EngineError, EngineOp, FakeBehavior, FakeMeshEngine, MeshEngine, RigRequest, SceneSummary};
use rig_persistence::StorageConfig;
use tempfile::TempDir;
use tokio::runtime::Handle;

fn config(dir: &Path) -> AppConfig {
    let template = dir.join("human.glb");
    std::fs::write(&template, template_scene(&["hips", "spine"])).unwrap();
    let mut config = AppConfig::from_lookup(|_| None).unwrap();
    config.template_path = template;
    config.storage = StorageConfig { cache_dir: dir.join("outputs"),
                                     scratch_dir: dir.join("scratch"),
                                     events_dir: None };
    config
}

fn service(engine: &Arc<FakeMeshEngine>) -> (TempDir, RigService) {
    let dir = tempfile::tempdir().unwrap();
    let svc = RigService::with_engine(config(dir.path()),
                                      engine.clone(),
                                      Arc::new(IdentityOptimizer),
                                      Handle::current()).unwrap();
    (dir, svc)
}

async fn wait_terminal(svc: &RigService, id: JobId) -> Job {
    for _ in 0..500 {
        let job = svc.status(id).unwrap();
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} did not reach a terminal state");
}

#[tokio::test(flavor = "multi_thread")]
async fn cube_upload_is_rigged_and_downloadable() {
    let engine = Arc::new(FakeMeshEngine::new());
    let (_dir, svc) = service(&engine);

    let id = svc.submit(cube_obj().into_bytes(), "obj").unwrap();
    let job = wait_terminal(&svc, id).await;
    assert_eq!(job.status, JobStatus::Succeeded, "{:?}", job.error_detail);
    assert!(job.result.is_some());

    let (bytes, name) = svc.download(id).unwrap();
    assert_eq!(name, "rigged.glb");
    let scene = FakeScene::parse(&String::from_utf8(bytes).unwrap()).unwrap();
    assert_eq!(scene.meshes[0].vertices.len(), 8);
    assert_eq!(scene.armatures[0].bones.len(), 2);
    assert_eq!(scene.parent.as_deref(), Some("Armature"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rig_failure_marks_job_failed_with_stderr() {
    let engine = Arc::new(FakeMeshEngine::new().with(EngineOp::Rig,
                                                      FakeBehavior::Fail("RuntimeError: no armature in template".into())));
    let (dir, svc) = service(&engine);

    let id = svc.submit(cube_obj().into_bytes(), "OBJ").unwrap();
    let job = wait_terminal(&svc, id).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_code.as_deref(), Some("RiggingError"));
    assert!(job.error_detail.unwrap().contains("no armature in template"));
    assert!(matches!(svc.download(id), Err(RigError::NotFound(_))));
    // nada publicado
    assert_eq!(std::fs::read_dir(dir.path().join("outputs")).unwrap().count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn identical_uploads_reuse_the_cached_artifact() {
    let engine = Arc::new(FakeMeshEngine::new());
    let (_dir, svc) = service(&engine);

    let first = svc.submit(cube_obj().into_bytes(), "obj").unwrap();
    let first_job = wait_terminal(&svc, first).await;
    let second = svc.submit(cube_obj().into_bytes(), "glb").unwrap();
    let second_job = wait_terminal(&svc, second).await;

    assert_ne!(first, second);
    assert_eq!(second_job.status, JobStatus::Succeeded);
    assert_eq!(first_job.result, second_job.result);
    assert_eq!(engine.calls(EngineOp::Rig), 1);
    assert!(svc.events(second)
               .iter()
               .any(|e| matches!(e.kind, PipelineEventKind::CacheHit { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn stalled_engine_is_a_timeout() {
    let engine = Arc::new(FakeMeshEngine::new().with(EngineOp::Prepare, FakeBehavior::Stall(Duration::from_millis(50))));
    let (_dir, svc) = service(&engine);

    let id = svc.submit(cube_obj().into_bytes(), "obj").unwrap();
    let job = wait_terminal(&svc, id).await;
    assert_eq!(job.error_code.as_deref(), Some("TimeoutError"));
    assert!(job.error_detail.unwrap().contains("'prepare'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_artifact_after_success_is_a_consistency_error() {
    let engine = Arc::new(FakeMeshEngine::new());
    let (_dir, svc) = service(&engine);

    let id = svc.submit(cube_obj().into_bytes(), "obj").unwrap();
    let job = wait_terminal(&svc, id).await;
    let locator = job.result.unwrap();
    std::fs::remove_file(locator.path()).unwrap();

    let err = svc.download(id).unwrap_err();
    assert_eq!(err.code(), "ConsistencyError");
}

#[test]
fn invalid_uploads_never_create_jobs() {
    tokio_test::block_on(async {
        let engine = Arc::new(FakeMeshEngine::new());
        let (_dir, svc) = service(&engine);

        for (bytes, ext) in [(Vec::new(), "obj"), (b"v 0 0 0".to_vec(), "exe"), (b"v 0 0 0".to_vec(), "")] {
            let err = svc.submit(bytes, ext).unwrap_err();
            assert_eq!(err.code(), "ValidationError");
        }
        assert!(svc.registry().is_empty());
        assert!(matches!(svc.status(JobId::new()), Err(RigError::NotFound(_))));
    });
}

#[test]
fn oversized_upload_is_rejected() {
    tokio_test::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path());
        cfg.uploads.max_bytes = 16;
        let svc = RigService::with_engine(cfg,
                                          Arc::new(FakeMeshEngine::new()),
                                          Arc::new(IdentityOptimizer),
                                          Handle::current()).unwrap();
        let err = svc.submit(cube_obj().into_bytes(), "obj").unwrap_err();
        assert!(err.to_string().contains("exceeds the 16 byte limit"));
    });
}

#[test]
fn malformed_template_fails_startup() {
    tokio_test::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        std::fs::write(&cfg.template_path, "o Body\nv 0 0 0\n").unwrap();
        let res = RigService::with_engine(cfg,
                                          Arc::new(FakeMeshEngine::new()),
                                          Arc::new(IdentityOptimizer),
                                          Handle::current());
        assert!(matches!(res, Err(CoreError::Pipeline(RigError::Validation(_)))));
    });
}

/// Delega en el fake y recuerda con qué archivo se llamó a prepare.
#[derive(Debug, Default)]
struct RecordingEngine {
    inner: FakeMeshEngine,
    prepared: Mutex<Vec<PathBuf>>,
}

impl MeshEngine for RecordingEngine {
    fn prepare(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        self.prepared.lock().unwrap().push(input.to_path_buf());
        self.inner.prepare(input, output)
    }

    fn inspect(&self, asset: &Path) -> Result<SceneSummary, EngineError> {
        self.inner.inspect(asset)
    }

    fn export_points(&self, asset: &Path) -> Result<Vec<[f64; 3]>, EngineError> {
        self.inner.export_points(asset)
    }

    fn rig(&self, request: &RigRequest) -> Result<(), EngineError> {
        self.inner.rig(request)
    }

    fn convert_template(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        self.inner.convert_template(input, output)
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn padded_extension_is_stored_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(RecordingEngine::default());
    let svc = RigService::with_engine(config(dir.path()),
                                      engine.clone(),
                                      Arc::new(IdentityOptimizer),
                                      Handle::current()).unwrap();

    let id = svc.submit(cube_obj().into_bytes(), " .OBJ ").unwrap();
    let job = wait_terminal(&svc, id).await;
    assert_eq!(job.status, JobStatus::Succeeded, "{:?}", job.error_detail);

    let prepared = engine.prepared.lock().unwrap().clone();
    assert_eq!(prepared.len(), 1);
    assert_eq!(prepared[0].file_name().and_then(|n| n.to_str()), Some("upload.obj"));
}
