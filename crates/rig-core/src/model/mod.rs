//! Modelos neutrales (Artifact, Fingerprint, StageContext, Job,...)

pub mod artifact;
pub mod asset;
pub mod context;
pub mod fingerprint;
pub mod job;
pub mod typed_artifact;

pub use artifact::{Artifact, ArtifactKind};
pub use asset::{normalize_extension, ArtifactLocator, DeliveredAsset, InputAsset, UploadedAsset};
pub use context::StageContext;
pub use fingerprint::{Fingerprint, StageFingerprintInput};
pub use job::{Job, JobId, JobStatus};
pub use typed_artifact::{ArtifactDecodeError, ArtifactSpec};
