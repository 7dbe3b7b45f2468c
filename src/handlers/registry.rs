use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::rule_handler::{RootNode, RuleHandler, RuleUpdate};
use super::{AssemblyReferenceHandler, PackageReferenceHandler, ProjectReferenceHandler};
use crate::dependency_tree::domain::{DependencyChanges, Snapshot, TargetFramework};

/// Explicit, process-local table of rule handlers, built once at startup
/// and passed by reference to the engine.
///
/// Rule name to handler is many-to-one (one handler subscribes to the
/// unresolved and resolved variants of its reference type). Dispatch runs
/// handlers in registration order and each handler sees only its own rule
/// updates, so handlers never observe each other's changes within one
/// cycle and downstream aggregation stays deterministic.
#[derive(Default)]
pub struct RuleHandlerRegistry {
    handlers: Vec<Arc<dyn RuleHandler>>,
    by_rule: HashMap<&'static str, usize>,
}

impl RuleHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard handler set: projects, packages, assemblies.
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ProjectReferenceHandler::new()));
        registry.register(Arc::new(PackageReferenceHandler::new()));
        registry.register(Arc::new(AssemblyReferenceHandler::new()));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn RuleHandler>) {
        let index = self.handlers.len();
        for rule_name in handler.rule_names() {
            self.by_rule.insert(rule_name, index);
        }
        self.handlers.push(handler);
    }

    pub fn handlers(&self) -> &[Arc<dyn RuleHandler>] {
        &self.handlers
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Every rule name some handler subscribes to, in registration order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.handlers
            .iter()
            .flat_map(|h| h.rule_names())
            .collect()
    }

    /// The grouping root nodes of all registered handlers, in registration
    /// order. Used by formatters as stable tree parents.
    pub fn root_nodes(&self) -> Vec<&'static RootNode> {
        self.handlers.iter().map(|h| h.create_root_node()).collect()
    }

    /// Dispatches one cycle's rule updates to the matching handlers and
    /// collects their deltas in registration order. Updates for rules no
    /// handler subscribes to are ignored.
    pub fn dispatch(
        &self,
        target_framework: &TargetFramework,
        updates: &[RuleUpdate],
        prior: Option<&Snapshot>,
    ) -> Vec<DependencyChanges> {
        for update in updates {
            if !self.by_rule.contains_key(update.rule_name()) {
                debug!(rule = update.rule_name(), "no handler for rule, ignoring");
            }
        }

        let mut all_changes = Vec::new();
        for (index, handler) in self.handlers.iter().enumerate() {
            let matching: Vec<&RuleUpdate> = updates
                .iter()
                .filter(|u| self.by_rule.get(u.rule_name()) == Some(&index))
                .collect();
            if matching.is_empty() {
                continue;
            }
            let changes = handler.handle(target_framework, &matching, prior);
            if !changes.is_empty() {
                all_changes.push(changes);
            }
        }
        all_changes
    }
}
