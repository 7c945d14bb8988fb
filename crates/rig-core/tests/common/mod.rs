#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use rig_core::{ArtifactKind, ArtifactLocator, ArtifactSpec, ContentCache, DeliveredAsset, Fingerprint, RigError,
               StageContext, StageKind, StageRunResultTyped, StageSignal, TypedStage, UploadedAsset};

/// Cache en disco mínima para tests: `<root>/<fp>.glb`.
#[derive(Debug)]
pub struct DirCache {
    root: PathBuf,
    pub publishes: AtomicUsize,
    entries: DashMap<Fingerprint, PathBuf>,
}

impl DirCache {
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf(),
               publishes: AtomicUsize::new(0),
               entries: DashMap::new() }
    }
}

impl ContentCache for DirCache {
    fn lookup(&self, fp: &Fingerprint) -> Result<Option<ArtifactLocator>, RigError> {
        Ok(self.entries.get(fp).map(|p| ArtifactLocator::new(p.value().clone())))
    }

    fn publish(&self, fp: &Fingerprint, staged: &Path) -> Result<ArtifactLocator, RigError> {
        let dest = self.root.join(format!("{fp}.glb"));
        std::fs::copy(staged, &dest)?;
        self.publishes.fetch_add(1, Ordering::SeqCst);
        self.entries.insert(fp.clone(), dest.clone());
        Ok(ArtifactLocator::new(dest))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staged {
    pub path: PathBuf,
}

impl ArtifactSpec for Staged {
    const KIND: ArtifactKind = ArtifactKind::Mesh;
}

/// Copia el upload a `staged.bin` dentro del workspace.
#[derive(Debug, Default)]
pub struct StageIn {
    pub runs: Arc<AtomicUsize>,
}

impl TypedStage for StageIn {
    type Params = ();
    type Input = UploadedAsset;
    type Output = Staged;

    fn id(&self) -> &'static str {
        "stage_in"
    }

    fn kind(&self) -> StageKind {
        StageKind::Prepare
    }

    fn run_typed(&self, input: UploadedAsset, _p: (), ctx: &StageContext) -> StageRunResultTyped<Staged> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let path = ctx.scratch_path("staged.bin");
        let res = std::fs::copy(&input.path, &path).map(|_| Staged { path })
                                                   .map_err(RigError::from);
        res.into()
    }
}

/// Entrega el archivo staged, emitiendo una señal.
#[derive(Debug, Default)]
pub struct StageOut {
    pub runs: Arc<AtomicUsize>,
}

impl TypedStage for StageOut {
    type Params = ();
    type Input = Staged;
    type Output = DeliveredAsset;

    fn id(&self) -> &'static str {
        "stage_out"
    }

    fn kind(&self) -> StageKind {
        StageKind::Optimize
    }

    fn run_typed(&self, input: Staged, _p: (), ctx: &StageContext) -> StageRunResultTyped<DeliveredAsset> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let path = ctx.scratch_path("out.glb");
        match std::fs::copy(&input.path, &path) {
            Ok(_) => StageRunResultTyped::SuccessWithSignals { output: DeliveredAsset { path },
                                                               signals: vec![StageSignal { signal: "DELIVERED".into(),
                                                                                           data: serde_json::json!({}) }] },
            Err(e) => StageRunResultTyped::Failure { error: e.into() },
        }
    }
}

/// Falla siempre con `Rigging`.
#[derive(Debug, Default)]
pub struct Broken;

impl TypedStage for Broken {
    type Params = ();
    type Input = Staged;
    type Output = DeliveredAsset;

    fn id(&self) -> &'static str {
        "broken"
    }

    fn kind(&self) -> StageKind {
        StageKind::DelegateRig
    }

    fn run_typed(&self, _input: Staged, _p: (), ctx: &StageContext) -> StageRunResultTyped<DeliveredAsset> {
        // deja un intermedio para verificar la limpieza del workspace
        let _ = std::fs::write(ctx.scratch_path("partial.glb"), b"partial");
        StageRunResultTyped::Failure { error: RigError::Rigging("weights did not converge".into()) }
    }
}

/// Cantidad de entradas que quedan bajo `dir`.
pub fn entries_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|it| it.count()).unwrap_or(0)
}
