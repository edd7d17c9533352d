//! Knowledge base: canonical entities and their store.

mod entry;
mod snapshot;
mod store;

pub use entry::{EntityId, KbEntry};
pub use snapshot::{KbSnapshot, SnapshotEntry};
pub use store::KbStore;
