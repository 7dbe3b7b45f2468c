use crate::dependency_tree::domain::AggregatedSnapshot;
use crate::handlers::RootNode;
use crate::shared::Result;

/// TreeFormatter port for rendering an aggregated snapshot.
///
/// Formatters group dependencies under the handlers' static root nodes:
/// cross-target (shared) entries first, then per-framework subtrees.
pub trait TreeFormatter {
    /// Renders the snapshot to a complete output string.
    ///
    /// `hide_invisible` filters out dependencies whose `visible` flag is
    /// false; this affects rendering only, never the snapshot itself.
    fn format(
        &self,
        snapshot: &AggregatedSnapshot,
        roots: &[&'static RootNode],
        hide_invisible: bool,
    ) -> Result<String>;
}

/// OutputPresenter port for delivering rendered output.
pub trait OutputPresenter {
    fn present(&self, content: &str) -> Result<()>;
}
