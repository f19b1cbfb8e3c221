//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the workflows to external systems:
//! - `ai` - Model providers (OpenAI-compatible HTTP, mock)
//! - `alerts` - Alert sinks (log, recording)
//! - `checkpoint` - Step checkpoint stores (in-memory, filesystem)
//! - `events` - Event bus implementations
//! - `storage` - Document store implementations

pub mod ai;
pub mod alerts;
pub mod checkpoint;
pub mod events;
pub mod storage;

pub use ai::{MockAIProvider, MockError, OpenAIConfig, OpenAIProvider};
pub use alerts::{RecordingAlertSink, TracingAlertSink};
pub use checkpoint::{FileCheckpointStore, InMemoryCheckpointStore};
pub use events::InMemoryEventBus;
pub use storage::InMemoryTherapyRepository;
