//! Alert sink adapters.

mod recording;
mod tracing_sink;

pub use recording::RecordingAlertSink;
pub use tracing_sink::TracingAlertSink;
