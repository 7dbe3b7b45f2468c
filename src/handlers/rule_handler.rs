use indexmap::IndexMap;
use tracing::warn;

use crate::dependency_tree::domain::{
    DependencyChanges, DependencyModel, ProviderType, Snapshot, TargetFramework,
};
use crate::shared::Result;

/// Property carried by resolved rule items that points back at the
/// declaring (unresolved) item spec.
pub const ORIGINAL_ITEM_SPEC_PROPERTY: &str = "OriginalItemSpec";

/// One raw evaluation item: the item spec plus its property bag in
/// evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleItem {
    item_spec: String,
    properties: IndexMap<String, String>,
}

impl RuleItem {
    pub fn new(item_spec: impl Into<String>) -> Self {
        Self {
            item_spec: item_spec.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: IndexMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn item_spec(&self) -> &str {
        &self.item_spec
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }
}

/// One raw update for a named evaluation rule, as delivered by the
/// upstream evaluation source.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleUpdate {
    rule_name: String,
    target_framework: TargetFramework,
    full_update: bool,
    added: Vec<RuleItem>,
    removed: Vec<String>,
}

impl RuleUpdate {
    /// An incremental update: `added`/`removed` are deltas.
    pub fn incremental(rule_name: impl Into<String>, target_framework: TargetFramework) -> Self {
        Self {
            rule_name: rule_name.into(),
            target_framework,
            full_update: false,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// A full/replace update: `added` is the complete current item set.
    pub fn full(rule_name: impl Into<String>, target_framework: TargetFramework) -> Self {
        Self {
            full_update: true,
            ..Self::incremental(rule_name, target_framework)
        }
    }

    pub fn with_added(mut self, item: RuleItem) -> Self {
        self.added.push(item);
        self
    }

    pub fn with_removed(mut self, item_spec: impl Into<String>) -> Self {
        self.removed.push(item_spec.into());
        self
    }

    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    pub fn target_framework(&self) -> &TargetFramework {
        &self.target_framework
    }

    pub fn is_full_update(&self) -> bool {
        self.full_update
    }

    pub fn added(&self) -> &[RuleItem] {
        &self.added
    }

    pub fn removed(&self) -> &[String] {
        &self.removed
    }
}

/// Static grouping pseudo-dependency used as the stable parent of one
/// provider's dependencies in rendered trees ("Projects", "Packages", ...).
/// Never derived from evaluation data and never folded into snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootNode {
    pub caption: &'static str,
    pub provider_type: ProviderType,
    pub flags: &'static [&'static str],
}

/// Polymorphic unit that recognizes one provider's evaluation rules
/// (unresolved + resolved variant) and converts raw property-bag updates
/// into typed dependency deltas.
///
/// The reconciliation loop is shared via the default `handle`; concrete
/// handlers supply identity and model construction. Handlers are
/// stateless: prior state reaches them through the previous snapshot.
pub trait RuleHandler: Send + Sync {
    /// Tag identifying dependencies produced by this handler.
    fn provider_type(&self) -> ProviderType;

    /// Rule carrying the declared (possibly unresolved) items.
    fn unresolved_rule(&self) -> &'static str;

    /// Rule carrying the items evaluation actually resolved.
    fn resolved_rule(&self) -> &'static str;

    /// The static grouping node for this provider.
    fn create_root_node(&self) -> &'static RootNode;

    /// Builds one dependency model from a raw item.
    ///
    /// `resolved_path` is `Some` when the item came from the resolved rule
    /// (or was previously resolved and is being re-declared). Returning an
    /// error marks the item malformed; it is skipped, never fatal.
    fn create_model(
        &self,
        target_framework: &TargetFramework,
        original_item_spec: &str,
        resolved_path: Option<&str>,
        properties: &IndexMap<String, String>,
    ) -> Result<DependencyModel>;

    /// All rule names this handler subscribes to.
    fn rule_names(&self) -> [&'static str; 2] {
        [self.unresolved_rule(), self.resolved_rule()]
    }

    /// Reconciles one cycle's updates for this handler against its own
    /// prior state and emits the delta.
    ///
    /// A full/replace update on the unresolved rule removes every
    /// previously known dependency of this provider not re-listed; a full
    /// update on the resolved rule downgrades missing entries to
    /// unresolved instead of removing them (the declaration rule owns
    /// existence, the resolved rule owns resolution).
    fn handle(
        &self,
        target_framework: &TargetFramework,
        updates: &[&RuleUpdate],
        prior: Option<&Snapshot>,
    ) -> DependencyChanges {
        let provider = self.provider_type();

        // Working set keyed by normalized original item spec, seeded from
        // this provider's entries in the prior snapshot.
        let mut working: IndexMap<String, DependencyModel> = IndexMap::new();
        if let Some(prior) = prior {
            for model in prior.models_for_provider(provider) {
                working.insert(
                    model.original_item_spec().to_ascii_lowercase(),
                    model.as_ref().clone(),
                );
            }
        }

        for update in updates {
            if update.rule_name() == self.unresolved_rule() {
                self.apply_unresolved(target_framework, update, &mut working);
            } else if update.rule_name() == self.resolved_rule() {
                self.apply_resolved(target_framework, update, &mut working);
            }
        }

        // Diff the working set against the prior snapshot.
        let mut changes = DependencyChanges::new(provider);
        if let Some(prior) = prior {
            for model in prior.models_for_provider(provider) {
                let key = model.original_item_spec().to_ascii_lowercase();
                if !working.contains_key(&key) {
                    changes.remove(model.id().clone());
                }
            }
        }
        for model in working.into_values() {
            let unchanged = prior
                .and_then(|p| p.get(model.id()).cloned())
                .is_some_and(|existing| existing.as_ref() == &model);
            if !unchanged {
                changes.add(model);
            }
        }
        changes
    }

    /// Applies one update of the declaration rule to the working set.
    #[doc(hidden)]
    fn apply_unresolved(
        &self,
        target_framework: &TargetFramework,
        update: &RuleUpdate,
        working: &mut IndexMap<String, DependencyModel>,
    ) {
        if update.is_full_update() {
            let retained: Vec<String> = update
                .added()
                .iter()
                .map(|item| item.item_spec().to_ascii_lowercase())
                .collect();
            working.retain(|key, _| retained.iter().any(|r| r == key));
        }

        for spec in update.removed() {
            working.shift_remove(&spec.to_ascii_lowercase());
        }

        for item in update.added() {
            let key = item.item_spec().to_ascii_lowercase();
            // A previously resolved dependency stays resolved when its
            // declaration is re-evaluated.
            let resolved_path = working
                .get(&key)
                .filter(|m| m.resolved())
                .map(|m| m.path().to_string());
            match self.create_model(
                target_framework,
                item.item_spec(),
                resolved_path.as_deref(),
                item.properties(),
            ) {
                Ok(model) => {
                    working.insert(key, model);
                }
                Err(error) => {
                    warn!(
                        rule = update.rule_name(),
                        item = item.item_spec(),
                        %error,
                        "skipping malformed item"
                    );
                }
            }
        }
    }

    /// Applies one update of the resolved rule to the working set.
    #[doc(hidden)]
    fn apply_resolved(
        &self,
        target_framework: &TargetFramework,
        update: &RuleUpdate,
        working: &mut IndexMap<String, DependencyModel>,
    ) {
        if update.is_full_update() {
            let resolved_now: Vec<String> = update
                .added()
                .iter()
                .map(|item| {
                    item.property(ORIGINAL_ITEM_SPEC_PROPERTY)
                        .unwrap_or(item.item_spec())
                        .to_ascii_lowercase()
                })
                .collect();
            self.downgrade_missing(target_framework, working, &resolved_now);
        }

        // Removed entries of a resolved rule carry the resolved spec
        // (the path); map them back through the working set.
        for removed in update.removed() {
            let removed_lower = removed.to_ascii_lowercase();
            let downgrade: Vec<String> = working
                .iter()
                .filter(|(_, m)| m.resolved() && m.path().to_ascii_lowercase() == removed_lower)
                .map(|(k, _)| k.clone())
                .collect();
            for key in downgrade {
                let declared = working[&key].properties().clone();
                match self.create_model(target_framework, working[&key].original_item_spec(), None, &declared)
                {
                    Ok(model) => {
                        working.insert(key, model);
                    }
                    Err(error) => {
                        warn!(rule = update.rule_name(), %error, "skipping malformed item");
                    }
                }
            }
        }

        for item in update.added() {
            let original = item
                .property(ORIGINAL_ITEM_SPEC_PROPERTY)
                .unwrap_or(item.item_spec());
            match self.create_model(
                target_framework,
                original,
                Some(item.item_spec()),
                item.properties(),
            ) {
                Ok(model) => {
                    working.insert(original.to_ascii_lowercase(), model);
                }
                Err(error) => {
                    warn!(
                        rule = update.rule_name(),
                        item = item.item_spec(),
                        %error,
                        "skipping malformed item"
                    );
                }
            }
        }
    }

    /// Downgrades resolved working entries not re-listed by a full
    /// resolved-rule update back to unresolved.
    #[doc(hidden)]
    fn downgrade_missing(
        &self,
        target_framework: &TargetFramework,
        working: &mut IndexMap<String, DependencyModel>,
        resolved_now: &[String],
    ) {
        let downgrade: Vec<String> = working
            .iter()
            .filter(|(key, m)| m.resolved() && !resolved_now.iter().any(|r| r == *key))
            .map(|(k, _)| k.clone())
            .collect();
        for key in downgrade {
            let spec = working[&key].original_item_spec().to_string();
            let declared = working[&key].properties().clone();
            if let Ok(model) = self.create_model(target_framework, &spec, None, &declared) {
                working.insert(key, model);
            }
        }
    }
}
