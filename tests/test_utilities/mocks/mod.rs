/// Mock implementations for testing
mod mock_snapshot_consumer;
mod mock_telemetry_sink;

pub use mock_snapshot_consumer::{ConsumerEvent, RecordingConsumer};
pub use mock_telemetry_sink::RecordingTelemetrySink;
