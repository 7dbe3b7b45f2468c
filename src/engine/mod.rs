/// Dataflow/subscription engine - the chained pipeline from upstream rule
/// updates to published aggregated snapshots.
pub mod pipeline;
pub mod subscription;

pub use pipeline::{DependencyTreeEngine, EngineConfig, SourceEvent, SourceHandle};
pub use subscription::{ConsumerLink, LinkState, Publication};
