use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use deptree::prelude::*;

/// Mock TelemetrySink that records each progress event.
#[derive(Default)]
pub struct RecordingTelemetrySink {
    events: Mutex<Vec<(String, BTreeSet<String>, bool)>>,
}

impl RecordingTelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, BTreeSet<String>, bool)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelemetrySink for RecordingTelemetrySink {
    async fn rules_observed(
        &self,
        target_framework: &TargetFramework,
        observed: &BTreeSet<String>,
        all_rules_seen: bool,
    ) {
        self.events.lock().unwrap().push((
            target_framework.as_str().to_string(),
            observed.clone(),
            all_rules_seen,
        ));
    }
}
