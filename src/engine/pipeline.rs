use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use super::subscription::{
    forward_to_consumer, ConsumerLink, LinkEntry, LinkSignal, LinkState, Publication,
    SharedLinkState,
};
use crate::dependency_tree::domain::{
    DependencyId, Snapshot, SourceId, TargetFramework, VersionVector,
};
use crate::dependency_tree::services::aggregate;
use crate::handlers::{RuleHandlerRegistry, RuleUpdate};
use crate::ports::{SnapshotConsumer, TelemetrySink};
use crate::shared::error::DepTreeError;
use crate::shared::Result;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of the serialized ingest queue. Upstream sources apply
    /// backpressure once this many events are waiting for a cycle.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { event_capacity: 64 }
    }
}

/// One event delivered by an upstream source.
#[derive(Debug)]
pub enum SourceEvent {
    /// A batch of rule updates for the source's target framework.
    Updates(Vec<RuleUpdate>),
    /// Display-order side channel: item specs in desired order.
    OrderedItems(Vec<String>),
    /// The source will deliver nothing further.
    Complete,
    /// The source broke; fatal to the whole pipeline instance.
    Fault(String),
}

struct EngineEvent {
    source: SourceId,
    target_framework: TargetFramework,
    event: SourceEvent,
}

/// Sending side of one upstream evaluation source.
///
/// Each handle delivers events serially into the engine's single ingest
/// queue; events from different handles interleave in arrival order.
#[derive(Clone)]
pub struct SourceHandle {
    source: SourceId,
    target_framework: TargetFramework,
    tx: mpsc::Sender<EngineEvent>,
}

impl SourceHandle {
    pub fn source_id(&self) -> &SourceId {
        &self.source
    }

    pub fn target_framework(&self) -> &TargetFramework {
        &self.target_framework
    }

    pub async fn send(&self, event: SourceEvent) -> Result<()> {
        self.tx
            .send(EngineEvent {
                source: self.source.clone(),
                target_framework: self.target_framework.clone(),
                event,
            })
            .await
            .map_err(|_| DepTreeError::EngineShutDown.into())
    }

    pub async fn send_updates(&self, updates: Vec<RuleUpdate>) -> Result<()> {
        self.send(SourceEvent::Updates(updates)).await
    }

    pub async fn send_ordered_items(&self, items: Vec<String>) -> Result<()> {
        self.send(SourceEvent::OrderedItems(items)).await
    }

    pub async fn complete(&self) -> Result<()> {
        self.send(SourceEvent::Complete).await
    }

    pub async fn fault(&self, message: impl Into<String>) -> Result<()> {
        self.send(SourceEvent::Fault(message.into())).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone)]
enum PipelineState {
    Running,
    Completed,
    Faulted(Arc<str>),
}

struct EngineShared {
    links: Arc<DashMap<u64, LinkEntry>>,
    sources: DashMap<SourceId, SourceStatus>,
    next_link_id: AtomicU64,
    /// Single-writer handle to the newest publication; swapped atomically
    /// after each fold/aggregate cycle so readers always see a complete
    /// value.
    current: RwLock<Option<Publication>>,
    state: RwLock<PipelineState>,
}

/// The dataflow/subscription engine.
///
/// Subscribes upstream rule-update sources, runs each event through
/// registry dispatch, snapshot fold, and cross-target aggregation - one
/// cycle at a time on a single task - and publishes every new aggregated
/// snapshot to all linked consumers. Completion and faults propagate to
/// every link; see the [`crate::ports::SnapshotConsumer`] contract.
pub struct DependencyTreeEngine {
    shared: Arc<EngineShared>,
    event_tx: mpsc::Sender<EngineEvent>,
    task: JoinHandle<()>,
}

impl DependencyTreeEngine {
    /// Starts the engine task. The registry and telemetry sink are fixed
    /// for the lifetime of the pipeline instance; there is no
    /// post-construction mutation.
    pub fn start(
        registry: RuleHandlerRegistry,
        telemetry: Option<Arc<dyn TelemetrySink>>,
        config: EngineConfig,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity.max(1));
        let shared = Arc::new(EngineShared {
            links: Arc::new(DashMap::new()),
            sources: DashMap::new(),
            next_link_id: AtomicU64::new(0),
            current: RwLock::new(None),
            state: RwLock::new(PipelineState::Running),
        });

        let task = tokio::spawn(engine_loop(
            Arc::clone(&shared),
            event_rx,
            registry,
            telemetry,
        ));

        Self {
            shared,
            event_tx,
            task,
        }
    }

    /// Registers one upstream source for a target framework and returns
    /// its sending handle. The pipeline completes once every registered
    /// source has completed.
    pub fn add_source(
        &self,
        name: impl Into<String>,
        target_framework: TargetFramework,
    ) -> SourceHandle {
        let source = SourceId::new(name);
        self.shared
            .sources
            .insert(source.clone(), SourceStatus::Active);
        SourceHandle {
            source,
            target_framework,
            tx: self.event_tx.clone(),
        }
    }

    /// Links a downstream consumer and starts pushing publications to it.
    ///
    /// A consumer linked after the pipeline reached a terminal state
    /// receives the terminal notification (and, on completion, the final
    /// snapshot) immediately.
    pub fn link_consumer(&self, consumer: Arc<dyn SnapshotConsumer>) -> ConsumerLink {
        let id = self.shared.next_link_id.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(SharedLinkState::new(LinkState::Linked));

        let initial = {
            let pipeline_state = self
                .shared
                .state
                .read()
                .expect("pipeline state lock poisoned")
                .clone();
            let current = self
                .shared
                .current
                .read()
                .expect("current publication lock poisoned")
                .clone();
            match pipeline_state {
                PipelineState::Running => match current {
                    Some(publication) => LinkSignal::Publish(publication),
                    None => LinkSignal::Idle,
                },
                PipelineState::Completed => LinkSignal::Completed { last: current },
                PipelineState::Faulted(message) => LinkSignal::Faulted { message },
            }
        };

        let (tx, rx) = watch::channel(initial);
        let forwarder = tokio::spawn(forward_to_consumer(rx, consumer, Arc::clone(&state)));
        self.shared.links.insert(id, LinkEntry { tx, forwarder });

        // The engine task may have reached a terminal state between the
        // state read above and the insert, in which case its terminal
        // iteration missed this link; re-check so the link still gets
        // exactly one terminal signal (the forwarder exits on the first
        // one it sees, so a duplicate send is harmless).
        let state_now = self
            .shared
            .state
            .read()
            .expect("pipeline state lock poisoned")
            .clone();
        match state_now {
            PipelineState::Running => {}
            PipelineState::Completed => {
                let last = self
                    .shared
                    .current
                    .read()
                    .expect("current publication lock poisoned")
                    .clone();
                if let Some(entry) = self.shared.links.get(&id) {
                    entry.tx.send_replace(LinkSignal::Completed { last });
                }
            }
            PipelineState::Faulted(message) => {
                if let Some(entry) = self.shared.links.get(&id) {
                    entry.tx.send_replace(LinkSignal::Faulted { message });
                }
            }
        }

        ConsumerLink::new(id, Arc::clone(&self.shared.links), state)
    }

    /// The newest publication, if any cycle has produced one yet.
    pub fn current(&self) -> Option<Publication> {
        self.shared
            .current
            .read()
            .expect("current publication lock poisoned")
            .clone()
    }

    /// Waits for the engine task to finish (all sources completed or a
    /// fault), then for every remaining link forwarder to drain.
    pub async fn join(self) -> Result<()> {
        let Self {
            shared,
            event_tx,
            task,
        } = self;
        // Release the engine's own sender so the loop also ends when all
        // source handles are gone without an explicit Complete.
        drop(event_tx);

        task.await
            .map_err(|e| anyhow::anyhow!("engine task panicked: {e}"))?;

        let mut forwarders = Vec::new();
        let ids: Vec<u64> = shared.links.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if let Some((_, entry)) = shared.links.remove(&id) {
                forwarders.push(entry.forwarder);
            }
        }
        for result in futures::future::join_all(forwarders).await {
            result.map_err(|e| anyhow::anyhow!("link forwarder panicked: {e}"))?;
        }
        Ok(())
    }
}

#[instrument(skip_all)]
async fn engine_loop(
    shared: Arc<EngineShared>,
    mut event_rx: mpsc::Receiver<EngineEvent>,
    registry: RuleHandlerRegistry,
    telemetry: Option<Arc<dyn TelemetrySink>>,
) {
    let expected_rules: BTreeSet<String> = registry
        .rule_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut snapshots: BTreeMap<TargetFramework, Arc<Snapshot>> = BTreeMap::new();
    let mut versions: VersionVector = BTreeMap::new();
    let mut observed_rules: BTreeMap<TargetFramework, BTreeSet<String>> = BTreeMap::new();

    while let Some(EngineEvent {
        source,
        target_framework,
        event,
    }) = event_rx.recv().await
    {
        match event {
            SourceEvent::Updates(updates) => {
                let version = versions.entry(source.clone()).or_insert(0);
                *version += 1;
                let version = *version;

                let prior = snapshots.get(&target_framework).cloned();
                let changes = registry.dispatch(&target_framework, &updates, prior.as_deref());
                let base = prior
                    .unwrap_or_else(|| Snapshot::empty(target_framework.clone()));
                let next = base.fold(&changes, version);
                let changed = !Arc::ptr_eq(&base, &next)
                    || !snapshots.contains_key(&target_framework);
                debug!(
                    %source,
                    target = %target_framework,
                    version,
                    dependencies = next.len(),
                    changed,
                    "processed rule-update batch"
                );
                snapshots.insert(target_framework.clone(), next);

                let observed = observed_rules
                    .entry(target_framework.clone())
                    .or_default();
                for update in &updates {
                    observed.insert(update.rule_name().to_string());
                }
                if let Some(sink) = &telemetry {
                    let all_seen = expected_rules.iter().all(|r| observed.contains(r));
                    sink.rules_observed(&target_framework, observed, all_seen)
                        .await;
                }

                if changed {
                    publish(&shared, &snapshots, &versions);
                }
            }
            SourceEvent::OrderedItems(items) => {
                let version = versions.entry(source.clone()).or_insert(0);
                *version += 1;
                let version = *version;

                if let Some(prior) = snapshots.get(&target_framework).cloned() {
                    let ordered: Vec<DependencyId> = items
                        .iter()
                        .flat_map(|spec| {
                            let lower = spec.to_ascii_lowercase();
                            prior
                                .dependencies()
                                .iter()
                                .filter(move |(_, m)| {
                                    m.original_item_spec().to_ascii_lowercase() == lower
                                })
                                .map(|(id, _)| id.clone())
                                .collect::<Vec<_>>()
                        })
                        .collect();
                    let next = prior.apply_ordering(&ordered, version);
                    if !Arc::ptr_eq(&prior, &next) {
                        snapshots.insert(target_framework.clone(), next);
                        publish(&shared, &snapshots, &versions);
                    }
                }
            }
            SourceEvent::Complete => {
                shared.sources.insert(source.clone(), SourceStatus::Completed);
                let all_completed = !shared.sources.is_empty()
                    && shared
                        .sources
                        .iter()
                        .all(|entry| *entry.value() == SourceStatus::Completed);
                debug!(%source, all_completed, "source completed");
                if all_completed {
                    complete_links(&shared);
                    return;
                }
            }
            SourceEvent::Fault(message) => {
                error!(%source, %message, "upstream source faulted, failing pipeline");
                fault_links(&shared, message);
                return;
            }
        }
    }

    // All source handles dropped without explicit completion; treat as
    // completed so linked consumers are not left hanging. A pipeline
    // that never had an active source (empty replay) ends here cleanly.
    let abandoned = shared
        .sources
        .iter()
        .filter(|entry| *entry.value() == SourceStatus::Active)
        .count();
    if abandoned > 0 {
        warn!(abandoned, "source handles dropped before completion");
    }
    complete_links(&shared);
}

fn publish(
    shared: &EngineShared,
    snapshots: &BTreeMap<TargetFramework, Arc<Snapshot>>,
    versions: &VersionVector,
) {
    let publication = Publication {
        snapshot: Arc::new(aggregate(snapshots)),
        versions: versions.clone(),
    };
    *shared
        .current
        .write()
        .expect("current publication lock poisoned") = Some(publication.clone());
    for entry in shared.links.iter() {
        entry.tx.send_replace(LinkSignal::Publish(publication.clone()));
    }
}

fn complete_links(shared: &EngineShared) {
    let last = shared
        .current
        .read()
        .expect("current publication lock poisoned")
        .clone();
    *shared.state.write().expect("pipeline state lock poisoned") = PipelineState::Completed;
    for entry in shared.links.iter() {
        entry
            .tx
            .send_replace(LinkSignal::Completed { last: last.clone() });
    }
}

fn fault_links(shared: &EngineShared, message: String) {
    let message: Arc<str> = message.into();
    *shared.state.write().expect("pipeline state lock poisoned") =
        PipelineState::Faulted(Arc::clone(&message));
    for entry in shared.links.iter() {
        entry.tx.send_replace(LinkSignal::Faulted {
            message: Arc::clone(&message),
        });
    }
}
