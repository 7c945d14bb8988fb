mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{entries_in, Broken, DirCache, StageIn, StageOut};
use rig_core::{CoordinatorBuilder, InputAsset, JobId, Pipe, PipelineEventKind, RigError, StageStatus};

fn dirs() -> (tempfile::TempDir, tempfile::TempDir) {
    (tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap())
}

#[test]
fn success_publishes_and_cleans_workspace() {
    let (store, scratch) = dirs();
    let cache = Arc::new(DirCache::new(store.path()));
    let coordinator = CoordinatorBuilder::new(cache.clone()).scratch_root(scratch.path())
                                                            .build();
    let def = Pipe::new(StageIn::default()).then(StageOut::default()).build();

    let asset = InputAsset::new(b"o cube\nv 0 0 0\n".to_vec(), "obj");
    let job = JobId::new();
    let locator = coordinator.run(job, &asset, &def).expect("run ok");

    assert!(locator.path().is_file());
    assert_eq!(std::fs::read(locator.path()).unwrap(), asset.bytes());
    assert!(locator.path().ends_with(format!("{}.glb", asset.fingerprint())));
    assert_eq!(entries_in(scratch.path()), 0, "workspace must be removed");

    let kinds: Vec<&'static str> = coordinator.events_for(job)
                                              .iter()
                                              .map(|e| match e.kind {
                                                  PipelineEventKind::PipelineInitialized { .. } => "init",
                                                  PipelineEventKind::StageStarted { .. } => "started",
                                                  PipelineEventKind::StageFinished { .. } => "finished",
                                                  PipelineEventKind::StageSignal { .. } => "signal",
                                                  PipelineEventKind::ArtifactPublished { .. } => "published",
                                                  PipelineEventKind::PipelineCompleted { .. } => "completed",
                                                  _ => "other",
                                              })
                                              .collect();
    assert_eq!(kinds,
               vec!["init", "started", "finished", "started", "signal", "finished", "published", "completed"]);

    let progress = coordinator.progress(job, &def);
    assert!(progress.completed);
    assert!(!progress.failed);
    assert!(progress.stages.iter().all(|s| s.status == StageStatus::FinishedOk));
}

#[test]
fn stage_failure_is_terminal_and_never_published() {
    let (store, scratch) = dirs();
    let cache = Arc::new(DirCache::new(store.path()));
    let coordinator = CoordinatorBuilder::new(cache.clone()).scratch_root(scratch.path())
                                                            .build();
    let def = Pipe::new(StageIn::default()).then(Broken).build();

    let asset = InputAsset::new(b"broken".to_vec(), "glb");
    let job = JobId::new();
    let err = coordinator.run(job, &asset, &def).unwrap_err();

    assert!(matches!(err, RigError::Rigging(_)));
    assert_eq!(err.code(), "RiggingError");
    assert_eq!(cache.publishes.load(Ordering::SeqCst), 0);
    assert_eq!(entries_in(store.path()), 0);
    assert_eq!(entries_in(scratch.path()), 0, "intermediates must be removed on failure");

    let events = coordinator.events_for(job);
    assert!(events.iter()
                  .any(|e| matches!(&e.kind, PipelineEventKind::StageFailed { stage_id, .. } if stage_id == "broken")));
    assert!(!events.iter()
                   .any(|e| matches!(e.kind, PipelineEventKind::PipelineCompleted { .. })));

    let progress = coordinator.progress(job, &def);
    assert!(progress.failed);
    assert_eq!(progress.stages[0].status, StageStatus::FinishedOk);
    assert_eq!(progress.stages[1].status, StageStatus::Failed);
}

#[test]
fn cache_hit_skips_every_stage() {
    let (store, scratch) = dirs();
    let cache = Arc::new(DirCache::new(store.path()));
    let coordinator = CoordinatorBuilder::new(cache.clone()).scratch_root(scratch.path())
                                                            .build();
    let first = StageIn::default();
    let runs = first.runs.clone();
    let def = Pipe::new(first).then(StageOut::default()).build();

    let asset = InputAsset::new(b"same bytes".to_vec(), "fbx");
    let a = coordinator.run(JobId::new(), &asset, &def).unwrap();
    // misma carga, distinta extensión: el fingerprint sólo mira los bytes
    let again = InputAsset::new(b"same bytes".to_vec(), "obj");
    let job = JobId::new();
    let b = coordinator.run(job, &again, &def).unwrap();

    assert_eq!(a, b);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(cache.publishes.load(Ordering::SeqCst), 1);
    let progress = coordinator.progress(job, &def);
    assert!(progress.cache_hit);
    assert!(progress.stages.iter().all(|s| s.status == StageStatus::Skipped));
}

#[test]
fn concurrent_identical_uploads_run_pipeline_once() {
    let (store, scratch) = dirs();
    let cache = Arc::new(DirCache::new(store.path()));
    let coordinator = Arc::new(CoordinatorBuilder::new(cache.clone()).scratch_root(scratch.path())
                                                                     .build());
    let first = StageIn::default();
    let runs = first.runs.clone();
    let def = Arc::new(Pipe::new(first).then(StageOut::default()).build());
    let asset = InputAsset::new(b"contended".to_vec(), "glb");

    let handles: Vec<_> = (0..6).map(|_| {
                                    let c = coordinator.clone();
                                    let d = def.clone();
                                    let a = asset.clone();
                                    std::thread::spawn(move || c.run(JobId::new(), &a, &d))
                                })
                                .collect();
    let locators: Vec<_> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();

    assert!(locators.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(cache.publishes.load(Ordering::SeqCst), 1);
}

#[test]
fn stage_fingerprints_are_deterministic_across_runs() {
    let def = Pipe::new(StageIn::default()).then(StageOut::default()).build();
    let asset = InputAsset::new(b"deterministic".to_vec(), "obj");

    let fingerprints = |coordinator: &rig_core::PipelineCoordinator<rig_core::InMemoryEventStore>, job| {
        coordinator.events_for(job)
                   .into_iter()
                   .filter_map(|e| match e.kind {
                       PipelineEventKind::StageFinished { fingerprint, .. } => Some(fingerprint),
                       _ => None,
                   })
                   .collect::<Vec<_>>()
    };

    let (s1, w1) = dirs();
    let c1 = CoordinatorBuilder::new(Arc::new(DirCache::new(s1.path()))).scratch_root(w1.path())
                                                                         .build();
    let j1 = JobId::new();
    c1.run(j1, &asset, &def).unwrap();

    let (s2, w2) = dirs();
    let c2 = CoordinatorBuilder::new(Arc::new(DirCache::new(s2.path()))).scratch_root(w2.path())
                                                                         .build();
    let j2 = JobId::new();
    c2.run(j2, &asset, &def).unwrap();

    let f1 = fingerprints(&c1, j1);
    assert_eq!(f1.len(), 2);
    assert_eq!(f1, fingerprints(&c2, j2));
}
