use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::dependency_tree::domain::{AggregatedSnapshot, VersionVector};
use crate::ports::SnapshotConsumer;

/// State of one downstream subscription link.
///
/// `Unlinked -> Linked -> Completed | Faulted`; the terminal states are
/// final. `unlink` returns a non-terminal link to `Unlinked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Unlinked = 0,
    Linked = 1,
    Completed = 2,
    Faulted = 3,
}

pub(crate) struct SharedLinkState(AtomicU8);

impl SharedLinkState {
    pub(crate) fn new(state: LinkState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn get(&self) -> LinkState {
        match self.0.load(Ordering::Acquire) {
            0 => LinkState::Unlinked,
            1 => LinkState::Linked,
            2 => LinkState::Completed,
            _ => LinkState::Faulted,
        }
    }

    pub(crate) fn set(&self, state: LinkState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// One published value: the aggregated snapshot plus the per-source
/// version vector it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    pub snapshot: Arc<AggregatedSnapshot>,
    pub versions: VersionVector,
}

/// Signal carried on a link's watch channel. The watch holds only the
/// newest signal, which is exactly the drop-and-coalesce policy for slow
/// consumers: intermediate snapshots are complete states, so only the
/// latest one matters to a consumer that hasn't caught up.
#[derive(Debug, Clone)]
pub(crate) enum LinkSignal {
    Idle,
    Publish(Publication),
    /// Terminal; `last` lets the forwarder flush a not-yet-delivered
    /// final snapshot before completing, so no update is dropped on
    /// shutdown.
    Completed { last: Option<Publication> },
    Faulted { message: Arc<str> },
}

pub(crate) struct LinkEntry {
    pub(crate) tx: watch::Sender<LinkSignal>,
    #[allow(dead_code)]
    pub(crate) forwarder: JoinHandle<()>,
}

/// Handle to one linked downstream consumer.
///
/// Dropping the handle does not unlink; call [`ConsumerLink::unlink`] to
/// stop publications to the consumer.
pub struct ConsumerLink {
    id: u64,
    links: Arc<DashMap<u64, LinkEntry>>,
    state: Arc<SharedLinkState>,
}

impl ConsumerLink {
    pub(crate) fn new(
        id: u64,
        links: Arc<DashMap<u64, LinkEntry>>,
        state: Arc<SharedLinkState>,
    ) -> Self {
        Self { id, links, state }
    }

    pub fn state(&self) -> LinkState {
        self.state.get()
    }

    /// Stops future publications to this consumer immediately. Delivery
    /// already in flight completes; terminal states are preserved.
    pub fn unlink(&self) {
        if self.links.remove(&self.id).is_some()
            && matches!(self.state.get(), LinkState::Linked)
        {
            self.state.set(LinkState::Unlinked);
        }
    }
}

/// Per-link forwarder loop: reads the newest signal from the watch,
/// delivers it to the consumer, and exits on a terminal signal or when
/// the link is removed (watch sender dropped).
pub(crate) async fn forward_to_consumer(
    mut rx: watch::Receiver<LinkSignal>,
    consumer: Arc<dyn SnapshotConsumer>,
    state: Arc<SharedLinkState>,
) {
    let mut delivered: Option<VersionVector> = None;
    loop {
        let signal = rx.borrow_and_update().clone();
        match signal {
            LinkSignal::Idle => {}
            LinkSignal::Publish(publication) => {
                if delivered.as_ref() != Some(&publication.versions) {
                    delivered = Some(publication.versions.clone());
                    consumer
                        .on_snapshot(publication.snapshot, publication.versions)
                        .await;
                }
            }
            LinkSignal::Completed { last } => {
                if let Some(publication) = last {
                    if delivered.as_ref() != Some(&publication.versions) {
                        consumer
                            .on_snapshot(publication.snapshot, publication.versions)
                            .await;
                    }
                }
                state.set(LinkState::Completed);
                consumer.on_completed().await;
                return;
            }
            LinkSignal::Faulted { message } => {
                state.set(LinkState::Faulted);
                consumer.on_fault(&message).await;
                return;
            }
        }
        if rx.changed().await.is_err() {
            // Unlinked: the sender side was dropped
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_link_state_round_trip() {
        let state = SharedLinkState::new(LinkState::Unlinked);
        assert_eq!(state.get(), LinkState::Unlinked);
        state.set(LinkState::Linked);
        assert_eq!(state.get(), LinkState::Linked);
        state.set(LinkState::Faulted);
        assert_eq!(state.get(), LinkState::Faulted);
    }
}
