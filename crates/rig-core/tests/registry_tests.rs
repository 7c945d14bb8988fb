use std::sync::Arc;

use rig_core::{ArtifactLocator, JobStatus, RigError, TaskRegistry};

#[test]
fn lifecycle_is_monotonic() {
    let registry = TaskRegistry::new();
    let id = registry.submit();
    assert_eq!(registry.get_status(id).unwrap().status, JobStatus::Queued);

    registry.mark_running(id).unwrap();
    registry.mark_succeeded(id, ArtifactLocator::new("outputs/abc.glb"))
            .unwrap();

    let job = registry.get_status(id).unwrap();
    assert_eq!(job.status, JobStatus::Succeeded);
    assert_eq!(job.result, Some(ArtifactLocator::new("outputs/abc.glb")));

    // terminal: no vuelve atrás
    let err = registry.mark_running(id).unwrap_err();
    assert!(matches!(err, RigError::InvalidTransition { .. }));
    assert!(registry.mark_failed(id, &RigError::Internal("late".into())).is_err());
    assert_eq!(registry.get_status(id).unwrap().status, JobStatus::Succeeded);
}

#[test]
fn failure_records_code_and_detail() {
    let registry = TaskRegistry::new();
    let id = registry.submit();
    registry.mark_running(id).unwrap();
    registry.mark_failed(id, &RigError::Timeout { stage: "prepare".into(),
                                                  ceiling_secs: 300 })
            .unwrap();

    let job = registry.get_status(id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_code.as_deref(), Some("TimeoutError"));
    assert!(job.error_detail.unwrap().contains("300s"));
    assert!(job.result.is_none());
}

#[test]
fn unknown_id_is_not_found() {
    let registry = TaskRegistry::new();
    let stray = rig_core::JobId::new();
    assert!(matches!(registry.get_status(stray), Err(RigError::NotFound(_))));
}

#[test]
fn concurrent_pollers_never_observe_regression() {
    let registry = Arc::new(TaskRegistry::new());
    let id = registry.submit();

    let poller = {
        let r = registry.clone();
        std::thread::spawn(move || {
            let mut last = 0u8;
            for _ in 0..2_000 {
                let rank = match r.get_status(id).unwrap().status {
                    JobStatus::Queued => 0,
                    JobStatus::Running => 1,
                    JobStatus::Succeeded | JobStatus::Failed => 2,
                };
                assert!(rank >= last, "status went backwards");
                last = rank;
            }
        })
    };

    registry.mark_running(id).unwrap();
    registry.mark_failed(id, &RigError::Rigging("boom".into())).unwrap();
    poller.join().unwrap();
    assert_eq!(registry.count(JobStatus::Failed), 1);
}
