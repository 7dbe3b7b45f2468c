use std::collections::BTreeMap;

use serde::Serialize;

use crate::dependency_tree::domain::{AggregatedSnapshot, DependencyModel, MergedEntry};
use crate::handlers::RootNode;
use crate::ports::TreeFormatter;
use crate::shared::Result;

/// Renders an aggregated snapshot as stable, pretty-printed JSON.
///
/// Output groups dependencies under each provider's root node, shared
/// cross-target entries before per-framework ones, in snapshot order.
#[derive(Debug, Default)]
pub struct JsonTreeFormatter;

impl JsonTreeFormatter {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TreeView {
    target_frameworks: Vec<String>,
    groups: Vec<GroupView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupView {
    caption: String,
    provider_type: String,
    flags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    shared: Vec<DependencyView>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    per_framework: BTreeMap<String, Vec<DependencyView>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DependencyView {
    caption: String,
    original_item_spec: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    path: String,
    resolved: bool,
    implicit: bool,
    flags: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
}

impl DependencyView {
    fn from_model(model: &DependencyModel) -> Self {
        Self {
            caption: model.caption().to_string(),
            original_item_spec: model.original_item_spec().to_string(),
            path: model.path().to_string(),
            resolved: model.resolved(),
            implicit: model.implicit(),
            flags: model.flags().iter().cloned().collect(),
            properties: model
                .properties()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl TreeFormatter for JsonTreeFormatter {
    fn format(
        &self,
        snapshot: &AggregatedSnapshot,
        roots: &[&'static RootNode],
        hide_invisible: bool,
    ) -> Result<String> {
        let mut groups = Vec::with_capacity(roots.len());

        for root in roots {
            let mut shared = Vec::new();
            let mut per_framework: BTreeMap<String, Vec<DependencyView>> = BTreeMap::new();

            for (key, entry) in snapshot.merged() {
                if key.provider_type() != root.provider_type {
                    continue;
                }
                match entry {
                    MergedEntry::Shared(model) => {
                        if hide_invisible && !model.visible() {
                            continue;
                        }
                        shared.push(DependencyView::from_model(model));
                    }
                    MergedEntry::PerFramework(members) => {
                        for (target_framework, model) in members {
                            if hide_invisible && !model.visible() {
                                continue;
                            }
                            per_framework
                                .entry(target_framework.as_str().to_string())
                                .or_default()
                                .push(DependencyView::from_model(model));
                        }
                    }
                }
            }

            groups.push(GroupView {
                caption: root.caption.to_string(),
                provider_type: root.provider_type.as_str().to_string(),
                flags: root.flags.iter().map(|f| f.to_string()).collect(),
                shared,
                per_framework,
            });
        }

        let view = TreeView {
            target_frameworks: snapshot
                .target_frameworks()
                .map(|tf| tf.as_str().to_string())
                .collect(),
            groups,
        };
        Ok(serde_json::to_string_pretty(&view)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency_tree::domain::{DependencyChanges, Snapshot, TargetFramework};
    use crate::dependency_tree::services::aggregate;
    use crate::handlers::{PackageReferenceHandler, RuleHandler, PACKAGE_PROVIDER};

    fn aggregated_with_package(visible: bool) -> AggregatedSnapshot {
        let tf = TargetFramework::new("net8.0").unwrap();
        let mut changes = DependencyChanges::new(PACKAGE_PROVIDER);
        changes.add(
            crate::dependency_tree::domain::DependencyModel::new(&tf, PACKAGE_PROVIDER, "Serilog")
                .unwrap()
                .with_resolved(true)
                .with_path("/nuget/serilog")
                .with_visible(visible),
        );
        let snapshot = Snapshot::empty(tf.clone()).fold(&[changes], 1);
        let mut map = std::collections::BTreeMap::new();
        map.insert(tf, snapshot);
        aggregate(&map)
    }

    #[test]
    fn test_json_output_contains_group_and_dependency() {
        let formatter = JsonTreeFormatter::new();
        let roots = vec![PackageReferenceHandler::new().create_root_node()];
        let output = formatter
            .format(&aggregated_with_package(true), &roots, false)
            .unwrap();

        assert!(output.contains("\"caption\": \"Packages\""));
        assert!(output.contains("\"originalItemSpec\": \"Serilog\""));
        assert!(output.contains("\"resolved\": true"));
    }

    #[test]
    fn test_json_output_hides_invisible_when_asked() {
        let formatter = JsonTreeFormatter::new();
        let roots = vec![PackageReferenceHandler::new().create_root_node()];
        let output = formatter
            .format(&aggregated_with_package(false), &roots, true)
            .unwrap();
        assert!(!output.contains("Serilog"));
    }

    #[test]
    fn test_json_output_is_stable() {
        let formatter = JsonTreeFormatter::new();
        let roots = vec![PackageReferenceHandler::new().create_root_node()];
        let snapshot = aggregated_with_package(true);
        let first = formatter.format(&snapshot, &roots, false).unwrap();
        let second = formatter.format(&snapshot, &roots, false).unwrap();
        assert_eq!(first, second);
    }
}
