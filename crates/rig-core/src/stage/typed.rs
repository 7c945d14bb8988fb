use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{StageKind, StageRunResult, StageSignal};
use crate::errors::RigError;
use crate::model::{ArtifactSpec, StageContext};

/// Resultado tipado de ejecutar un `TypedStage`.
pub enum StageRunResultTyped<Out: ArtifactSpec> {
    Success { output: Out },
    SuccessWithSignals { output: Out, signals: Vec<StageSignal> },
    Failure { error: RigError },
}

impl<Out: ArtifactSpec> StageRunResultTyped<Out> {
    /// Convierte a `StageRunResult` neutro serializando el output.
    pub fn into_neutral(self) -> StageRunResult {
        match self {
            StageRunResultTyped::Success { output } => match output.into_artifact() {
                Ok(art) => StageRunResult::Success { outputs: vec![art] },
                Err(e) => StageRunResult::Failure { error: e.into() },
            },
            StageRunResultTyped::SuccessWithSignals { output, signals } => match output.into_artifact() {
                Ok(art) => StageRunResult::SuccessWithSignals { outputs: vec![art],
                                                                signals },
                Err(e) => StageRunResult::Failure { error: e.into() },
            },
            StageRunResultTyped::Failure { error } => StageRunResult::Failure { error },
        }
    }
}

impl<Out: ArtifactSpec> From<Result<Out, RigError>> for StageRunResultTyped<Out> {
    fn from(res: Result<Out, RigError>) -> Self {
        match res {
            Ok(output) => StageRunResultTyped::Success { output },
            Err(error) => StageRunResultTyped::Failure { error },
        }
    }
}

/// Interfaz de alto nivel para definir Stages con tipos fuertes
/// (Params / Input / Output).
pub trait TypedStage: Send + Sync + Debug {
    type Params: DeserializeOwned + Serialize + Clone + Default;
    type Input: ArtifactSpec;
    type Output: ArtifactSpec;

    fn id(&self) -> &'static str;

    fn kind(&self) -> StageKind;

    fn params_default(&self) -> Self::Params {
        Default::default()
    }

    fn run_typed(&self, input: Self::Input, params: Self::Params, ctx: &StageContext)
                 -> StageRunResultTyped<Self::Output>;
}

// -------------------------------------------------------------
// Adaptador: cualquier `TypedStage` implementa `StageDefinition` neutro.
// -------------------------------------------------------------
impl<T> crate::stage::StageDefinition for T where T: TypedStage + 'static
{
    fn id(&self) -> &str {
        <Self as TypedStage>::id(self)
    }

    fn base_params(&self) -> Value {
        serde_json::to_value(self.params_default()).unwrap_or(Value::Null)
    }

    fn run(&self, ctx: &StageContext) -> StageRunResult {
        // Params inválidos caen a los defaults del stage
        let params: T::Params = serde_json::from_value(ctx.params.clone()).unwrap_or_else(|_| self.params_default());

        let input = match T::Input::from_artifact(&ctx.input) {
            Ok(i) => i,
            Err(e) => return StageRunResult::Failure { error: e.into() },
        };

        self.run_typed(input, params, ctx).into_neutral()
    }

    fn kind(&self) -> StageKind {
        <Self as TypedStage>::kind(self)
    }
}
