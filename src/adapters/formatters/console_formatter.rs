use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::dependency_tree::domain::{AggregatedSnapshot, DependencyModel, MergedEntry};
use crate::handlers::RootNode;
use crate::ports::TreeFormatter;
use crate::shared::Result;

/// Renders an aggregated snapshot as a colored console tree: resolved
/// dependencies green, unresolved yellow, implicit ones dimmed.
#[derive(Debug, Default)]
pub struct ConsoleTreeFormatter {
    colored: bool,
}

impl ConsoleTreeFormatter {
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Plain output for non-tty targets and tests.
    pub fn plain() -> Self {
        Self { colored: false }
    }

    fn render_model(&self, model: &DependencyModel) -> String {
        let marker = if model.resolved() {
            "[resolved]"
        } else {
            "[unresolved]"
        };
        let line = format!("{} {}", model.caption(), marker);
        if !self.colored {
            return line;
        }
        if model.implicit() {
            format!("{}", line.dimmed())
        } else if model.resolved() {
            format!("{} {}", model.caption(), marker.green())
        } else {
            format!("{} {}", model.caption(), marker.yellow())
        }
    }
}

impl TreeFormatter for ConsoleTreeFormatter {
    fn format(
        &self,
        snapshot: &AggregatedSnapshot,
        roots: &[&'static RootNode],
        hide_invisible: bool,
    ) -> Result<String> {
        let mut output = String::from("Dependencies\n");

        for root in roots {
            let mut shared = Vec::new();
            let mut per_framework: Vec<(String, Vec<&DependencyModel>)> = snapshot
                .target_frameworks()
                .map(|tf| (tf.as_str().to_string(), Vec::new()))
                .collect();

            for (key, entry) in snapshot.merged() {
                if key.provider_type() != root.provider_type {
                    continue;
                }
                match entry {
                    MergedEntry::Shared(model) => {
                        if !hide_invisible || model.visible() {
                            shared.push(model.as_ref());
                        }
                    }
                    MergedEntry::PerFramework(members) => {
                        for (target_framework, model) in members {
                            if hide_invisible && !model.visible() {
                                continue;
                            }
                            if let Some((_, bucket)) = per_framework
                                .iter_mut()
                                .find(|(name, _)| name == target_framework.as_str())
                            {
                                bucket.push(model.as_ref());
                            }
                        }
                    }
                }
            }

            per_framework.retain(|(_, bucket)| !bucket.is_empty());
            if shared.is_empty() && per_framework.is_empty() {
                continue;
            }

            writeln!(output, "├── {}", root.caption)?;
            for model in shared {
                writeln!(output, "│   ├── {}", self.render_model(model))?;
            }
            for (target_framework, bucket) in per_framework {
                writeln!(output, "│   ├── {}", target_framework)?;
                for model in bucket {
                    writeln!(output, "│   │   ├── {}", self.render_model(model))?;
                }
            }
        }

        Ok(output)
    }
}
