/// Ports - interfaces between the engine core and its external
/// collaborators (evaluation sources upstream, consumers downstream).
pub mod snapshot_consumer;
pub mod telemetry_sink;
pub mod trace_source;
pub mod tree_formatter;

pub use snapshot_consumer::SnapshotConsumer;
pub use telemetry_sink::TelemetrySink;
pub use trace_source::{TraceBatch, TraceSource};
pub use tree_formatter::{OutputPresenter, TreeFormatter};
