//! Checkpoint store adapters.

mod file;
mod in_memory;

pub use file::FileCheckpointStore;
pub use in_memory::{InMemoryCheckpointStore, DEFAULT_MAX_RUNS};
