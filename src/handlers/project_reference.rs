use indexmap::IndexMap;

use super::file_stem_caption;
use super::rule_handler::{RootNode, RuleHandler};
use crate::dependency_tree::domain::{DependencyModel, ProviderType, TargetFramework};
use crate::shared::Result;

pub const PROJECT_PROVIDER: ProviderType = ProviderType::new("Project");

static PROJECTS_ROOT: RootNode = RootNode {
    caption: "Projects",
    provider_type: PROJECT_PROVIDER,
    flags: &["ProjectDependencyGroup", "VirtualFolder"],
};

/// Handles project-to-project references ("ProjectReference" declarations
/// and their "ResolvedProjectReference" counterparts).
#[derive(Debug, Default)]
pub struct ProjectReferenceHandler;

impl ProjectReferenceHandler {
    pub fn new() -> Self {
        Self
    }
}

impl RuleHandler for ProjectReferenceHandler {
    fn provider_type(&self) -> ProviderType {
        PROJECT_PROVIDER
    }

    fn unresolved_rule(&self) -> &'static str {
        "ProjectReference"
    }

    fn resolved_rule(&self) -> &'static str {
        "ResolvedProjectReference"
    }

    fn create_root_node(&self) -> &'static RootNode {
        &PROJECTS_ROOT
    }

    fn create_model(
        &self,
        target_framework: &TargetFramework,
        original_item_spec: &str,
        resolved_path: Option<&str>,
        properties: &IndexMap<String, String>,
    ) -> Result<DependencyModel> {
        let resolved = resolved_path.is_some();
        let visible = !properties
            .get("Visible")
            .is_some_and(|v| v.eq_ignore_ascii_case("false"));

        Ok(DependencyModel::new(
            target_framework,
            PROJECT_PROVIDER,
            original_item_spec,
        )?
        .with_path(resolved_path.unwrap_or_default())
        .with_caption(file_stem_caption(original_item_spec))
        .with_resolved(resolved)
        .with_visible(visible)
        .with_flag("ProjectDependency")
        .with_flag(if resolved { "Resolved" } else { "Unresolved" })
        .with_properties(properties.clone()))
    }
}
