use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use deptree::prelude::*;

/// One observed delivery.
#[derive(Debug, Clone)]
pub enum ConsumerEvent {
    Snapshot {
        snapshot: Arc<AggregatedSnapshot>,
        versions: VersionVector,
    },
    Completed,
    Faulted(String),
}

/// Mock SnapshotConsumer that records every delivery, optionally
/// simulating a slow consumer with a per-snapshot delay.
pub struct RecordingConsumer {
    events: Mutex<Vec<ConsumerEvent>>,
    delay: Option<Duration>,
}

impl RecordingConsumer {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            delay: Some(delay),
        }
    }

    pub fn events(&self) -> Vec<ConsumerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn snapshot_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ConsumerEvent::Snapshot { .. }))
            .count()
    }

    pub fn completed(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ConsumerEvent::Completed))
    }

    pub fn fault_message(&self) -> Option<String> {
        self.events().iter().find_map(|e| match e {
            ConsumerEvent::Faulted(message) => Some(message.clone()),
            _ => None,
        })
    }

    pub fn last_snapshot(&self) -> Option<Arc<AggregatedSnapshot>> {
        self.events().iter().rev().find_map(|e| match e {
            ConsumerEvent::Snapshot { snapshot, .. } => Some(Arc::clone(snapshot)),
            _ => None,
        })
    }

    /// Every version vector observed, in delivery order.
    pub fn observed_versions(&self) -> Vec<VersionVector> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                ConsumerEvent::Snapshot { versions, .. } => Some(versions.clone()),
                _ => None,
            })
            .collect()
    }

    /// Polls until at least `count` snapshots have been delivered.
    pub async fn wait_for_snapshots(&self, count: usize) {
        for _ in 0..500 {
            if self.snapshot_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "timed out waiting for {} snapshots (got {})",
            count,
            self.snapshot_count()
        );
    }
}

#[async_trait]
impl SnapshotConsumer for RecordingConsumer {
    async fn on_snapshot(&self, snapshot: Arc<AggregatedSnapshot>, versions: VersionVector) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.events
            .lock()
            .unwrap()
            .push(ConsumerEvent::Snapshot { snapshot, versions });
    }

    async fn on_completed(&self) {
        self.events.lock().unwrap().push(ConsumerEvent::Completed);
    }

    async fn on_fault(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ConsumerEvent::Faulted(message.to_string()));
    }
}
