use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::run_result::StageRunResult;
use crate::hashing::hash_value;
use crate::model::StageContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageKind {
    Prepare,
    Align,
    DelegateRig,
    Optimize,
}

/// Trait que define un Stage. Debe depender sólo del input, los params y
/// los colaboradores que el stage recibió al construirse.
pub trait StageDefinition: Send + Sync {
    /// Identificador estable y único dentro del pipeline.
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn name(&self) -> &str {
        self.id()
    }

    /// Parámetros base deterministas.
    fn base_params(&self) -> Value;

    fn run(&self, ctx: &StageContext) -> StageRunResult;

    fn kind(&self) -> StageKind;

    /// Hash de la definición del stage (id, kind, params).
    fn definition_hash(&self) -> String {
        hash_value(&json!({
                       "id": self.id(),
                       "kind": format!("{:?}", self.kind()),
                       "base_params": self.base_params(),
                   }))
    }
}
