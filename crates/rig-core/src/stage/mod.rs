//! Definiciones relacionadas a Stages.
//!
//! Un Stage transforma exactamente un `Artifact` de entrada en 0..n artifacts
//! de salida, pudiendo delegar trabajo bloqueante a colaboradores externos.
//! Este módulo define:
//! - `StageDefinition`: interfaz neutral usada por el coordinador.
//! - `TypedStage`: interfaz de alto nivel con tipos fuertes.
//! - `StageRunResult` y señales (`StageSignal`).
//! - `Pipe` para construir pipelines tipados que validan IO en compilación.

pub mod definition;
pub mod pipeline;
mod run_result;
mod status;
pub mod typed;

pub use definition::{StageDefinition, StageKind};
pub use pipeline::{Pipe, SameAs};
pub use run_result::{StageRunResult, StageSignal};
pub use status::StageStatus;
pub use typed::{StageRunResultTyped, TypedStage};
