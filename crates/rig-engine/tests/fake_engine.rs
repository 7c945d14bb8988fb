use std::time::Duration;

use rig_engine::fake::{cube_obj, template_scene, FakeScene};
use rig_engine::{EngineError, EngineOp, FakeBehavior, FakeMeshEngine, MeshEngine, RigRequest};

fn identity() -> [[f64; 4]; 4] {
    [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
}

#[test]
fn prepare_then_rig_binds_cube_to_armature() {
    let dir = tempfile::tempdir().unwrap();
    let upload = dir.path().join("upload.obj");
    let canonical = dir.path().join("canonical.glb");
    let template = dir.path().join("template.glb");
    let rigged = dir.path().join("rigged.glb");
    std::fs::write(&upload, cube_obj()).unwrap();
    std::fs::write(&template, template_scene(&["root", "spine"])).unwrap();

    let engine = FakeMeshEngine::new();
    engine.prepare(&upload, &canonical).unwrap();
    assert_eq!(engine.export_points(&canonical).unwrap().len(), 8);
    assert_eq!(engine.export_points(&template).unwrap().len(), 42);

    engine.rig(&RigRequest { input: canonical,
                             template,
                             output: rigged.clone(),
                             matrix: identity(),
                             smooth_iterations: 10,
                             smooth_factor: 0.5 })
          .unwrap();

    let out = FakeScene::parse(&std::fs::read_to_string(&rigged).unwrap()).unwrap();
    assert_eq!(out.meshes[0].vertices.len(), 8);
    assert_eq!(out.armatures[0].bones.len(), 2);
    assert_eq!(out.parent.as_deref(), Some("Armature"));
    assert_eq!(engine.calls(EngineOp::Rig), 1);
    assert_eq!(engine.rig_requests().len(), 1);
}

#[test]
fn configured_failures_surface_as_engine_errors() {
    let dir = tempfile::tempdir().unwrap();
    let upload = dir.path().join("upload.obj");
    std::fs::write(&upload, cube_obj()).unwrap();

    let failing = FakeMeshEngine::new().with(EngineOp::Prepare, FakeBehavior::Fail("bad mesh".into()));
    let err = failing.prepare(&upload, &dir.path().join("c.glb")).unwrap_err();
    assert_eq!(err.stderr(), Some("bad mesh"));

    let stalled = FakeMeshEngine::new().with(EngineOp::Prepare, FakeBehavior::Stall(Duration::from_millis(20)));
    let err = stalled.prepare(&upload, &dir.path().join("c.glb")).unwrap_err();
    assert!(matches!(err, EngineError::Timeout { operation: EngineOp::Prepare, .. }));

    let silent = FakeMeshEngine::new().with(EngineOp::Prepare, FakeBehavior::NoOutput);
    silent.prepare(&upload, &dir.path().join("c.glb")).unwrap();
    assert!(!dir.path().join("c.glb").exists());
}

#[test]
fn template_with_two_meshes_fails_rig() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.glb");
    let template = dir.path().join("t.glb");
    std::fs::write(&input, cube_obj()).unwrap();
    std::fs::write(&template, format!("{}o Extra\nv 0 0 0\n", template_scene(&["root"]))).unwrap();

    let err = FakeMeshEngine::new().rig(&RigRequest { input,
                                                      template,
                                                      output: dir.path().join("out.glb"),
                                                      matrix: identity(),
                                                      smooth_iterations: 10,
                                                      smooth_factor: 0.5 })
                                   .unwrap_err();
    assert!(err.stderr().unwrap().contains("template"));
}

#[test]
fn convert_template_keeps_armature_and_rejects_bare_meshes() {
    let dir = tempfile::tempdir().unwrap();
    let fbx = dir.path().join("human.fbx");
    let glb = dir.path().join("human.glb");
    std::fs::write(&fbx, template_scene(&["root", "spine", "head"])).unwrap();

    let engine = FakeMeshEngine::new();
    engine.convert_template(&fbx, &glb).unwrap();
    let summary = engine.inspect(&glb).unwrap();
    assert_eq!(summary.armatures.len(), 1);
    assert_eq!(summary.armatures[0].bones, vec!["root", "spine", "head"]);
    assert_eq!(engine.calls(EngineOp::ConvertTemplate), 1);

    let bare = dir.path().join("cube.fbx");
    std::fs::write(&bare, cube_obj()).unwrap();
    let err = engine.convert_template(&bare, &dir.path().join("cube.glb")).unwrap_err();
    assert_eq!(err.stderr(), Some("template contains no armature"));
}
