use std::path::Path;

use crate::dependency_tree::domain::TargetFramework;
use crate::handlers::RuleUpdate;
use crate::shared::Result;

/// One recorded batch from an evaluation source: either a set of rule
/// updates or an ordered-items (display order) side-channel update, both
/// tagged with the originating source and target framework.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceBatch {
    Updates {
        source: String,
        target_framework: TargetFramework,
        updates: Vec<RuleUpdate>,
    },
    OrderedItems {
        source: String,
        target_framework: TargetFramework,
        items: Vec<String>,
    },
}

impl TraceBatch {
    pub fn source(&self) -> &str {
        match self {
            TraceBatch::Updates { source, .. } | TraceBatch::OrderedItems { source, .. } => source,
        }
    }

    pub fn target_framework(&self) -> &TargetFramework {
        match self {
            TraceBatch::Updates {
                target_framework, ..
            }
            | TraceBatch::OrderedItems {
                target_framework, ..
            } => target_framework,
        }
    }
}

/// TraceSource port for reading a recorded evaluation trace.
///
/// Abstracts where traces come from (files today, a live evaluation
/// session in an embedding host) so the replay path can be tested against
/// in-memory sources.
pub trait TraceSource: Send + Sync {
    /// Reads and parses all batches of one trace, in recorded order.
    ///
    /// # Errors
    /// Returns an error if the trace cannot be read or is not valid.
    fn read_batches(&self, path: &Path) -> Result<Vec<TraceBatch>>;
}
