//! Coordinador del pipeline de rigging.
//!
//! Provee el `PipelineCoordinator` (cache -> stages -> publicación) y su
//! builder.

pub mod builder;
pub mod core;

pub use builder::CoordinatorBuilder;
pub use core::PipelineCoordinator;
