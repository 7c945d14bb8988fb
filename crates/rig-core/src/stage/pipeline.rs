use std::marker::PhantomData;

use super::{StageDefinition, TypedStage};
use crate::model::{DeliveredAsset, UploadedAsset};
use crate::repo::{build_pipeline_definition, PipelineDefinition};

/// Marker trait to assert two types are the same at compile time.
/// Implemented only for identical types (T: SameAs<T> for all T).
pub trait SameAs<T> {}
impl<T> SameAs<T> for T {}

/// Typed pipeline builder that enforces at compile time that the next stage's
/// input matches the previous stage's output, that the first stage consumes
/// the upload and that the last one produces a deliverable.
///
/// Usage:
///   let def = Pipe::new(prepare).then(align).then(rig).then(optimize).build();
pub struct Pipe<S: TypedStage + 'static> {
    stages: Vec<Box<dyn StageDefinition>>,
    _out: PhantomData<fn() -> <S as TypedStage>::Output>,
}

impl<S: TypedStage + 'static> Pipe<S> {
    pub fn new(stage: S) -> Self
        where S: TypedStage<Input = UploadedAsset>
    {
        Self { stages: vec![Box::new(stage)],
               _out: PhantomData }
    }

    /// Append a new stage, enforcing N::Input == S::Output at compile time.
    pub fn then<N>(mut self, next: N) -> Pipe<N>
        where N: TypedStage + 'static,
              <N as TypedStage>::Input: SameAs<<S as TypedStage>::Output>
    {
        self.stages.push(Box::new(next));
        Pipe::<N> { stages: self.stages,
                    _out: PhantomData }
    }

    /// Build a PipelineDefinition from the typed pipe.
    pub fn build(self) -> PipelineDefinition
        where S: TypedStage<Output = DeliveredAsset>
    {
        build_pipeline_definition(self.stages)
    }
}
