use std::collections::BTreeMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::dependency_tree::domain::{
    AggregatedSnapshot, DependencyModel, MergeKey, MergedEntry, Snapshot, TargetFramework,
};

/// Combines per-target-framework snapshots into one cross-target view.
///
/// Dependencies are grouped by (provider type, original item spec). A
/// group is promoted to a single shared entry when it is present in every
/// target framework and `resolved` + `path` are identical across all of
/// them; otherwise each framework keeps its own copy.
///
/// Frameworks whose snapshot has not been produced yet are simply absent
/// from the input map and therefore omitted - never an error. The
/// computation is pure: structurally equal inputs yield structurally
/// equal outputs.
pub fn aggregate(
    per_framework: &BTreeMap<TargetFramework, Arc<Snapshot>>,
) -> AggregatedSnapshot {
    let framework_count = per_framework.len();
    let mut groups: IndexMap<MergeKey, BTreeMap<TargetFramework, Arc<DependencyModel>>> =
        IndexMap::new();

    // Frameworks iterate in BTreeMap order and dependencies in snapshot
    // insertion order, so the merged view's order is deterministic.
    for (target_framework, snapshot) in per_framework {
        for model in snapshot.dependencies().values() {
            let key = MergeKey::new(model.provider_type(), model.original_item_spec());
            groups
                .entry(key)
                .or_default()
                .insert(target_framework.clone(), Arc::clone(model));
        }
    }

    let mut merged: IndexMap<MergeKey, MergedEntry> = IndexMap::with_capacity(groups.len());
    for (key, members) in groups {
        if framework_count > 0 && members.len() == framework_count && resolution_identical(&members)
        {
            let representative = members
                .values()
                .next()
                .cloned()
                .expect("promoted group has at least one member");
            merged.insert(key, MergedEntry::Shared(representative));
        } else {
            merged.insert(key, MergedEntry::PerFramework(members));
        }
    }

    AggregatedSnapshot::new(per_framework.clone(), merged)
}

fn resolution_identical(members: &BTreeMap<TargetFramework, Arc<DependencyModel>>) -> bool {
    let mut iter = members.values();
    let first = match iter.next() {
        Some(model) => model,
        None => return false,
    };
    iter.all(|m| m.resolved() == first.resolved() && m.path() == first.path())
}
