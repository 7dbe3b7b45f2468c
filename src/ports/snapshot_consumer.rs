use std::sync::Arc;

use async_trait::async_trait;

use crate::dependency_tree::domain::{AggregatedSnapshot, VersionVector};

/// SnapshotConsumer port - the downstream side of the pipeline.
///
/// Consumers (tree views, graph views, collectors) receive each newly
/// published aggregated snapshot together with the provenance version
/// vector, and must treat both as immutable values.
///
/// # Delivery contract
/// - Snapshots arrive in publication order; a slow consumer may skip
///   intermediate versions (publication coalesces to the newest value)
///   but never observes a version regression.
/// - Exactly one of `on_completed` / `on_fault` is called, last.
///
/// # Async Support
/// Implementations must be `Send + Sync`; delivery happens on a
/// per-link forwarder task.
#[async_trait]
pub trait SnapshotConsumer: Send + Sync {
    /// Called with each newly published aggregated snapshot.
    async fn on_snapshot(&self, snapshot: Arc<AggregatedSnapshot>, versions: VersionVector);

    /// Called once when every upstream source has completed and the final
    /// snapshot has been flushed.
    async fn on_completed(&self);

    /// Called once when any upstream source faulted; the pipeline
    /// instance is broken and will publish nothing further.
    async fn on_fault(&self, message: &str);
}
