mod defaults;
mod snapshot;
mod tiered;

pub use defaults::default_events;
pub use snapshot::{EnvSnapshot, FixedSnapshot, SnapshotSource};
pub use tiered::{ListSource, TieredEventStore};
