use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{DependencyModel, ProviderType, Snapshot, TargetFramework};

/// Identifies one upstream data source feeding the pipeline (typically one
/// evaluation subscription per target framework).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-source version counters published with every aggregated snapshot,
/// letting consumers detect staleness per upstream source.
pub type VersionVector = BTreeMap<SourceId, u64>;

/// Cross-framework grouping key: dependencies with the same provider type
/// and (normalized) original item spec describe the same logical reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    provider_type: ProviderType,
    original_item_spec: String,
}

impl MergeKey {
    pub fn new(provider_type: ProviderType, original_item_spec: &str) -> Self {
        Self {
            provider_type,
            original_item_spec: original_item_spec.to_ascii_lowercase(),
        }
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    pub fn original_item_spec(&self) -> &str {
        &self.original_item_spec
    }
}

/// One entry of the merged cross-target view.
#[derive(Debug, Clone, PartialEq)]
pub enum MergedEntry {
    /// The dependency is present in every target framework with identical
    /// resolution outcome; promoted to a single shared top-level entry.
    /// The model is the representative from the first framework in order.
    Shared(Arc<DependencyModel>),
    /// Resolution differs (or the dependency is missing somewhere); each
    /// framework keeps its own copy under its per-framework subtree.
    PerFramework(BTreeMap<TargetFramework, Arc<DependencyModel>>),
}

impl MergedEntry {
    pub fn is_shared(&self) -> bool {
        matches!(self, MergedEntry::Shared(_))
    }
}

/// Cross-target view over all per-framework snapshots.
///
/// The merged view is a pure function of `per_framework`: recomputing from
/// structurally equal inputs yields a structurally equal value, so
/// consumers can skip redundant redraws with a plain equality check.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSnapshot {
    per_framework: BTreeMap<TargetFramework, Arc<Snapshot>>,
    merged: IndexMap<MergeKey, MergedEntry>,
}

impl AggregatedSnapshot {
    pub(crate) fn new(
        per_framework: BTreeMap<TargetFramework, Arc<Snapshot>>,
        merged: IndexMap<MergeKey, MergedEntry>,
    ) -> Self {
        Self {
            per_framework,
            merged,
        }
    }

    pub fn empty() -> Self {
        Self {
            per_framework: BTreeMap::new(),
            merged: IndexMap::new(),
        }
    }

    pub fn per_framework(&self) -> &BTreeMap<TargetFramework, Arc<Snapshot>> {
        &self.per_framework
    }

    pub fn snapshot_for(&self, target_framework: &TargetFramework) -> Option<&Arc<Snapshot>> {
        self.per_framework.get(target_framework)
    }

    /// The merged view, in first-seen order across frameworks.
    pub fn merged(&self) -> &IndexMap<MergeKey, MergedEntry> {
        &self.merged
    }

    pub fn target_frameworks(&self) -> impl Iterator<Item = &TargetFramework> {
        self.per_framework.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_key_normalizes_spec() {
        let provider = ProviderType::new("Package");
        let a = MergeKey::new(provider, "Serilog");
        let b = MergeKey::new(provider, "serilog");
        assert_eq!(a, b);
    }

    #[test]
    fn test_merge_key_distinguishes_providers() {
        let a = MergeKey::new(ProviderType::new("Package"), "serilog");
        let b = MergeKey::new(ProviderType::new("Project"), "serilog");
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_aggregated_snapshot() {
        let agg = AggregatedSnapshot::empty();
        assert!(agg.per_framework().is_empty());
        assert!(agg.merged().is_empty());
    }
}
