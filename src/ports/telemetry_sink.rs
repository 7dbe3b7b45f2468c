use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::dependency_tree::domain::TargetFramework;

/// TelemetrySink port - observes evaluation progress per target framework.
///
/// After each processed rule-update batch the engine reports the set of
/// rule names observed so far for that target, plus whether that set now
/// covers every rule the registered handlers listen for. The latter is
/// the signal that a full evaluation round has been seen and the tree can
/// be considered complete for that target.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn rules_observed(
        &self,
        target_framework: &TargetFramework,
        observed: &BTreeSet<String>,
        all_rules_seen: bool,
    );
}
