/// Estado de un Stage dentro de una corrida.
///
/// Las transiciones válidas son:
/// - `Pending` -> `Running`
/// - `Running` -> `FinishedOk`
/// - `Running` -> `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Running,
    FinishedOk,
    Failed,
    /// La corrida resolvió por cache y el stage nunca se ejecutó.
    Skipped,
}
