use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::info;

use crate::dependency_tree::domain::TargetFramework;
use crate::ports::TelemetrySink;

/// TelemetrySink adapter that logs evaluation progress through `tracing`.
///
/// Emits one event per processed batch and an explicit "tree complete"
/// event the first time a target framework has seen every handled rule.
#[derive(Debug, Default)]
pub struct TracingTelemetryLogger;

impl TracingTelemetryLogger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TelemetrySink for TracingTelemetryLogger {
    async fn rules_observed(
        &self,
        target_framework: &TargetFramework,
        observed: &BTreeSet<String>,
        all_rules_seen: bool,
    ) {
        info!(
            target_framework = %target_framework,
            observed = observed.len(),
            all_rules_seen,
            "evaluation rules observed"
        );
    }
}
