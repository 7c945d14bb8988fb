//! autorig: servicio de auto-rigging de mallas 3D.
//!
//! Este crate es la fachada del workspace:
//! - `config`: `AppConfig` desde `.env`/variables `RIG_*`.
//! - `errors`: errores de arranque (`CoreError`) y de upload (`DomainError`).
//! - `service`: `RigService` con `submit`, `status` y `download`.
//!
//! El pipeline en sí vive en `rig-core` (coordinador) y `rig-adapters`
//! (stages).

pub mod config;
pub mod errors;
pub mod service;

pub use config::{AppConfig, UploadLimits};
pub use errors::{CoreError, DomainError};
pub use service::RigService;
