use indexmap::IndexMap;

use super::file_stem_caption;
use super::rule_handler::{RootNode, RuleHandler};
use crate::dependency_tree::domain::{DependencyModel, ProviderType, TargetFramework};
use crate::shared::Result;

pub const ASSEMBLY_PROVIDER: ProviderType = ProviderType::new("Assembly");

static ASSEMBLIES_ROOT: RootNode = RootNode {
    caption: "Assemblies",
    provider_type: ASSEMBLY_PROVIDER,
    flags: &["AssemblyDependencyGroup", "VirtualFolder"],
};

/// Handles direct assembly references ("Reference" declarations and their
/// "ResolvedReference" counterparts).
#[derive(Debug, Default)]
pub struct AssemblyReferenceHandler;

impl AssemblyReferenceHandler {
    pub fn new() -> Self {
        Self
    }
}

impl RuleHandler for AssemblyReferenceHandler {
    fn provider_type(&self) -> ProviderType {
        ASSEMBLY_PROVIDER
    }

    fn unresolved_rule(&self) -> &'static str {
        "Reference"
    }

    fn resolved_rule(&self) -> &'static str {
        "ResolvedReference"
    }

    fn create_root_node(&self) -> &'static RootNode {
        &ASSEMBLIES_ROOT
    }

    fn create_model(
        &self,
        target_framework: &TargetFramework,
        original_item_spec: &str,
        resolved_path: Option<&str>,
        properties: &IndexMap<String, String>,
    ) -> Result<DependencyModel> {
        let resolved = resolved_path.is_some();
        // Framework assemblies injected by the SDK are implicit.
        let implicit = properties
            .get("FrameworkAssembly")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let visible = !properties
            .get("Visible")
            .is_some_and(|v| v.eq_ignore_ascii_case("false"));

        Ok(DependencyModel::new(
            target_framework,
            ASSEMBLY_PROVIDER,
            original_item_spec,
        )?
        .with_path(resolved_path.unwrap_or_default())
        .with_caption(file_stem_caption(original_item_spec))
        .with_resolved(resolved)
        .with_implicit(implicit)
        .with_visible(visible)
        .with_flag("AssemblyDependency")
        .with_flag(if resolved { "Resolved" } else { "Unresolved" })
        .with_properties(properties.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net8() -> TargetFramework {
        TargetFramework::new("net8.0").unwrap()
    }

    #[test]
    fn test_caption_from_dll_path() {
        let handler = AssemblyReferenceHandler::new();
        let model = handler
            .create_model(&net8(), "lib/System.Text.Json.dll", None, &IndexMap::new())
            .unwrap();
        assert_eq!(model.caption(), "System.Text.Json");
    }

    #[test]
    fn test_plain_assembly_name_caption() {
        let handler = AssemblyReferenceHandler::new();
        let model = handler
            .create_model(&net8(), "System.Memory", None, &IndexMap::new())
            .unwrap();
        assert_eq!(model.caption(), "System.Memory");
    }

    #[test]
    fn test_framework_assembly_is_implicit() {
        let handler = AssemblyReferenceHandler::new();
        let mut properties = IndexMap::new();
        properties.insert("FrameworkAssembly".to_string(), "true".to_string());
        let model = handler
            .create_model(&net8(), "mscorlib", None, &properties)
            .unwrap();
        assert!(model.implicit());
    }
}
