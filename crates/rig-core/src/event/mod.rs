//! Definiciones de eventos y trait EventStore.

mod store;
mod types;

pub use store::EventStore;
pub use store::InMemoryEventStore;
pub use types::{PipelineEvent, PipelineEventKind};
