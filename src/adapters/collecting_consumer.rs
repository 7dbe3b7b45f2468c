use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::dependency_tree::domain::{AggregatedSnapshot, VersionVector};
use crate::ports::SnapshotConsumer;

/// SnapshotConsumer adapter that retains the newest publication, used by
/// the replay CLI to pick up the final tree after the pipeline completes.
#[derive(Debug, Default)]
pub struct CollectingConsumer {
    latest: Mutex<Option<(Arc<AggregatedSnapshot>, VersionVector)>>,
    fault: Mutex<Option<String>>,
}

impl CollectingConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<(Arc<AggregatedSnapshot>, VersionVector)> {
        self.latest.lock().expect("collector lock poisoned").clone()
    }

    pub fn fault(&self) -> Option<String> {
        self.fault.lock().expect("collector lock poisoned").clone()
    }
}

#[async_trait]
impl SnapshotConsumer for CollectingConsumer {
    async fn on_snapshot(&self, snapshot: Arc<AggregatedSnapshot>, versions: VersionVector) {
        *self.latest.lock().expect("collector lock poisoned") = Some((snapshot, versions));
    }

    async fn on_completed(&self) {}

    async fn on_fault(&self, message: &str) {
        *self.fault.lock().expect("collector lock poisoned") = Some(message.to_string());
    }
}
