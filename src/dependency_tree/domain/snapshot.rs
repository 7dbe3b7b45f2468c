use std::sync::Arc;

use indexmap::IndexMap;

use super::{DependencyChanges, DependencyId, DependencyModel, ProviderType, TargetFramework};

/// Immutable, versioned state of all dependencies for one target framework.
///
/// Snapshots are shared as `Arc<Snapshot>` and never mutated in place:
/// every update folds into a new value, and consumers that have not yet
/// observed the new version keep reading the old one safely.
///
/// Dependencies are kept in first-insertion order so the rendered tree is
/// stable across incremental updates: replacing an entry preserves its
/// position, new entries are appended.
#[derive(Debug, PartialEq)]
pub struct Snapshot {
    target_framework: TargetFramework,
    dependencies: IndexMap<DependencyId, Arc<DependencyModel>>,
    version: u64,
}

impl Snapshot {
    /// An empty snapshot at version 0, the seed of every fold lineage.
    pub fn empty(target_framework: TargetFramework) -> Arc<Self> {
        Arc::new(Self {
            target_framework,
            dependencies: IndexMap::new(),
            version: 0,
        })
    }

    pub fn target_framework(&self) -> &TargetFramework {
        &self.target_framework
    }

    pub fn dependencies(&self) -> &IndexMap<DependencyId, Arc<DependencyModel>> {
        &self.dependencies
    }

    pub fn get(&self, id: &DependencyId) -> Option<&Arc<DependencyModel>> {
        self.dependencies.get(id)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Models belonging to one provider, in snapshot order. Used by rule
    /// handlers to reconcile full/replace updates against their own prior
    /// state.
    pub fn models_for_provider(&self, provider_type: ProviderType) -> Vec<Arc<DependencyModel>> {
        self.dependencies
            .values()
            .filter(|m| m.provider_type() == provider_type)
            .cloned()
            .collect()
    }

    /// Folds a cycle's change sets over this snapshot, producing the next
    /// snapshot in the lineage.
    ///
    /// Within each change set removals apply first, then additions
    /// insert-or-replace; across change sets, last write wins in list
    /// order. The result is stamped `max(self.version, source_version)`.
    ///
    /// A fold that changes nothing returns `self` by reference (the same
    /// `Arc`), which keeps no-op updates free and lets downstream skip
    /// redundant work via pointer equality.
    pub fn fold(
        self: &Arc<Self>,
        changes: &[DependencyChanges],
        source_version: u64,
    ) -> Arc<Self> {
        let mut dependencies = self.dependencies.clone();
        let mut mutated = false;

        for change in changes {
            for id in change.removed() {
                // shift_remove keeps the remaining entries in order
                if dependencies.shift_remove(id).is_some() {
                    mutated = true;
                }
            }
            for model in change.added() {
                match dependencies.get(model.id()) {
                    Some(existing) if existing.as_ref() == model.as_ref() => {}
                    _ => {
                        // insert preserves the position of an existing key
                        // and appends a new one
                        dependencies.insert(model.id().clone(), Arc::clone(model));
                        mutated = true;
                    }
                }
            }
        }

        if !mutated {
            return Arc::clone(self);
        }

        Arc::new(Self {
            target_framework: self.target_framework.clone(),
            dependencies,
            version: self.version.max(source_version),
        })
    }

    /// Reorders dependencies to match an externally supplied display
    /// order (the "ordered items" side channel). Ids listed in `ordered`
    /// come first in that order; unlisted entries keep their relative
    /// order after them. A no-op reordering returns `self` by reference.
    pub fn apply_ordering(
        self: &Arc<Self>,
        ordered: &[DependencyId],
        source_version: u64,
    ) -> Arc<Self> {
        let mut reordered: IndexMap<DependencyId, Arc<DependencyModel>> =
            IndexMap::with_capacity(self.dependencies.len());

        for id in ordered {
            if let Some(model) = self.dependencies.get(id) {
                reordered.insert(id.clone(), Arc::clone(model));
            }
        }
        for (id, model) in &self.dependencies {
            if !reordered.contains_key(id) {
                reordered.insert(id.clone(), Arc::clone(model));
            }
        }

        let unchanged = reordered
            .keys()
            .zip(self.dependencies.keys())
            .all(|(a, b)| a == b);
        if unchanged {
            return Arc::clone(self);
        }

        Arc::new(Self {
            target_framework: self.target_framework.clone(),
            dependencies: reordered,
            version: self.version.max(source_version),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE: ProviderType = ProviderType::new("Package");

    fn net8() -> TargetFramework {
        TargetFramework::new("net8.0").unwrap()
    }

    fn add_changes(specs: &[&str]) -> DependencyChanges {
        let tf = net8();
        let mut changes = DependencyChanges::new(PACKAGE);
        for spec in specs {
            changes.add(DependencyModel::new(&tf, PACKAGE, *spec).unwrap());
        }
        changes
    }

    fn specs_of(snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .dependencies()
            .values()
            .map(|m| m.original_item_spec().to_string())
            .collect()
    }

    #[test]
    fn test_fold_empty_changes_returns_same_reference() {
        let snapshot = Snapshot::empty(net8()).fold(&[add_changes(&["A"])], 1);
        let folded = snapshot.fold(&[], 2);
        assert!(Arc::ptr_eq(&snapshot, &folded));
        assert_eq!(folded.version(), 1);
    }

    #[test]
    fn test_fold_noop_remove_returns_same_reference() {
        let snapshot = Snapshot::empty(net8()).fold(&[add_changes(&["A"])], 1);
        let mut changes = DependencyChanges::new(PACKAGE);
        changes.remove(DependencyId::new(&net8(), PACKAGE, "Absent"));
        let folded = snapshot.fold(&[changes], 5);
        assert!(Arc::ptr_eq(&snapshot, &folded));
    }

    #[test]
    fn test_fold_identical_readd_returns_same_reference() {
        let snapshot = Snapshot::empty(net8()).fold(&[add_changes(&["A"])], 1);
        let folded = snapshot.fold(&[add_changes(&["A"])], 2);
        assert!(Arc::ptr_eq(&snapshot, &folded));
    }

    #[test]
    fn test_fold_order_stability() {
        let snapshot = Snapshot::empty(net8()).fold(&[add_changes(&["A", "B", "C"])], 1);

        let mut changes = DependencyChanges::new(PACKAGE);
        changes.remove(DependencyId::new(&net8(), PACKAGE, "C"));
        changes.add(DependencyModel::new(&net8(), PACKAGE, "D").unwrap());
        let snapshot = snapshot.fold(&[changes], 2);

        assert_eq!(specs_of(&snapshot), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_fold_update_preserves_position() {
        let snapshot = Snapshot::empty(net8()).fold(&[add_changes(&["A", "B", "C"])], 1);

        let mut changes = DependencyChanges::new(PACKAGE);
        changes.add(
            DependencyModel::new(&net8(), PACKAGE, "B")
                .unwrap()
                .with_resolved(true),
        );
        let snapshot = snapshot.fold(&[changes], 2);

        assert_eq!(specs_of(&snapshot), vec!["A", "B", "C"]);
        let id = DependencyId::new(&net8(), PACKAGE, "B");
        assert!(snapshot.get(&id).unwrap().resolved());
    }

    #[test]
    fn test_fold_version_monotonicity() {
        let s1 = Snapshot::empty(net8()).fold(&[add_changes(&["A"])], 7);
        assert_eq!(s1.version(), 7);

        // A later fold stamped with a lower source version never regresses
        let s2 = s1.fold(&[add_changes(&["B"])], 3);
        assert_eq!(s2.version(), 7);

        let s3 = s2.fold(&[add_changes(&["C"])], 9);
        assert_eq!(s3.version(), 9);
    }

    #[test]
    fn test_fold_add_and_remove_same_id() {
        // Assumed contract: within one change set, the add survives a
        // remove of the same id because removals are applied first.
        let snapshot = Snapshot::empty(net8()).fold(&[add_changes(&["A"])], 1);

        let mut changes = DependencyChanges::new(PACKAGE);
        changes.remove(DependencyId::new(&net8(), PACKAGE, "A"));
        changes.add(
            DependencyModel::new(&net8(), PACKAGE, "A")
                .unwrap()
                .with_resolved(true),
        );
        let snapshot = snapshot.fold(&[changes], 2);

        let id = DependencyId::new(&net8(), PACKAGE, "A");
        assert!(snapshot.get(&id).unwrap().resolved());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_apply_ordering_reorders_known_ids() {
        let snapshot = Snapshot::empty(net8()).fold(&[add_changes(&["A", "B", "C"])], 1);
        let order = vec![
            DependencyId::new(&net8(), PACKAGE, "C"),
            DependencyId::new(&net8(), PACKAGE, "A"),
        ];
        let snapshot = snapshot.apply_ordering(&order, 2);
        assert_eq!(specs_of(&snapshot), vec!["C", "A", "B"]);
        assert_eq!(snapshot.version(), 2);
    }

    #[test]
    fn test_apply_ordering_noop_returns_same_reference() {
        let snapshot = Snapshot::empty(net8()).fold(&[add_changes(&["A", "B"])], 1);
        let order = vec![
            DependencyId::new(&net8(), PACKAGE, "A"),
            DependencyId::new(&net8(), PACKAGE, "B"),
        ];
        let reordered = snapshot.apply_ordering(&order, 2);
        assert!(Arc::ptr_eq(&snapshot, &reordered));
    }

    #[test]
    fn test_models_for_provider_filters() {
        let tf = net8();
        let project = ProviderType::new("Project");
        let mut changes = DependencyChanges::new(project);
        changes.add(DependencyModel::new(&tf, project, "Lib.csproj").unwrap());

        let snapshot =
            Snapshot::empty(tf).fold(&[add_changes(&["A", "B"]), changes], 1);
        assert_eq!(snapshot.models_for_provider(PACKAGE).len(), 2);
        assert_eq!(snapshot.models_for_provider(project).len(), 1);
    }
}
