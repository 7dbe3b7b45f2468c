/// Domain layer - pure, immutable dependency-tree value objects.
///
/// Nothing in this module performs I/O or schedules work; every type is a
/// value that can be shared across tasks by reference.
pub mod aggregated;
pub mod changes;
pub mod dependency_model;
pub mod snapshot;
pub mod target_framework;

pub use aggregated::{AggregatedSnapshot, MergeKey, MergedEntry, SourceId, VersionVector};
pub use changes::DependencyChanges;
pub use dependency_model::{DependencyId, DependencyModel, ProviderType};
pub use snapshot::Snapshot;
pub use target_framework::TargetFramework;
