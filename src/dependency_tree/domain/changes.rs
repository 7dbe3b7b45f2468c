use std::sync::Arc;

use super::{DependencyId, DependencyModel, ProviderType};

/// One rule handler's delta against the previous snapshot: ids to remove
/// and models to insert or replace, in handler-emission order.
///
/// Removals are applied before additions, so a change set that both
/// removes and adds the same id resolves to "present" (last write wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyChanges {
    provider_type: Option<ProviderType>,
    removed: Vec<DependencyId>,
    added: Vec<Arc<DependencyModel>>,
}

impl DependencyChanges {
    pub fn new(provider_type: ProviderType) -> Self {
        Self {
            provider_type: Some(provider_type),
            removed: Vec::new(),
            added: Vec::new(),
        }
    }

    pub fn provider_type(&self) -> Option<ProviderType> {
        self.provider_type
    }

    pub fn remove(&mut self, id: DependencyId) {
        self.removed.push(id);
    }

    pub fn add(&mut self, model: DependencyModel) {
        self.added.push(Arc::new(model));
    }

    pub fn removed(&self) -> &[DependencyId] {
        &self.removed
    }

    pub fn added(&self) -> &[Arc<DependencyModel>] {
        &self.added
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}
