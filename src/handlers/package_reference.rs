use indexmap::IndexMap;

use super::rule_handler::{RootNode, RuleHandler};
use crate::dependency_tree::domain::{DependencyModel, ProviderType, TargetFramework};
use crate::shared::Result;

pub const PACKAGE_PROVIDER: ProviderType = ProviderType::new("Package");

static PACKAGES_ROOT: RootNode = RootNode {
    caption: "Packages",
    provider_type: PACKAGE_PROVIDER,
    flags: &["PackageDependencyGroup", "VirtualFolder"],
};

/// Handles NuGet package references ("PackageReference" declarations and
/// their "ResolvedPackageReference" counterparts).
#[derive(Debug, Default)]
pub struct PackageReferenceHandler;

impl PackageReferenceHandler {
    pub fn new() -> Self {
        Self
    }
}

impl RuleHandler for PackageReferenceHandler {
    fn provider_type(&self) -> ProviderType {
        PACKAGE_PROVIDER
    }

    fn unresolved_rule(&self) -> &'static str {
        "PackageReference"
    }

    fn resolved_rule(&self) -> &'static str {
        "ResolvedPackageReference"
    }

    fn create_root_node(&self) -> &'static RootNode {
        &PACKAGES_ROOT
    }

    fn create_model(
        &self,
        target_framework: &TargetFramework,
        original_item_spec: &str,
        resolved_path: Option<&str>,
        properties: &IndexMap<String, String>,
    ) -> Result<DependencyModel> {
        let resolved = resolved_path.is_some();
        let caption = match properties.get("Version") {
            Some(version) if !version.is_empty() => {
                format!("{} ({})", original_item_spec, version)
            }
            _ => original_item_spec.to_string(),
        };
        let implicit = properties
            .get("IsImplicitlyDefined")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let visible = !properties
            .get("Visible")
            .is_some_and(|v| v.eq_ignore_ascii_case("false"));

        Ok(DependencyModel::new(
            target_framework,
            PACKAGE_PROVIDER,
            original_item_spec,
        )?
        .with_path(resolved_path.unwrap_or_default())
        .with_caption(caption)
        .with_resolved(resolved)
        .with_implicit(implicit)
        .with_visible(visible)
        .with_flag("PackageDependency")
        .with_flag(if resolved { "Resolved" } else { "Unresolved" })
        .with_properties(properties.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::rule_handler::{RuleItem, RuleUpdate};

    fn net8() -> TargetFramework {
        TargetFramework::new("net8.0").unwrap()
    }

    #[test]
    fn test_rule_names() {
        let handler = PackageReferenceHandler::new();
        assert_eq!(
            handler.rule_names(),
            ["PackageReference", "ResolvedPackageReference"]
        );
    }

    #[test]
    fn test_root_node_is_static() {
        let handler = PackageReferenceHandler::new();
        let a = handler.create_root_node();
        let b = handler.create_root_node();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.caption, "Packages");
    }

    #[test]
    fn test_caption_includes_version() {
        let handler = PackageReferenceHandler::new();
        let mut properties = IndexMap::new();
        properties.insert("Version".to_string(), "13.0.1".to_string());
        let model = handler
            .create_model(&net8(), "Newtonsoft.Json", None, &properties)
            .unwrap();
        assert_eq!(model.caption(), "Newtonsoft.Json (13.0.1)");
        assert!(!model.resolved());
    }

    #[test]
    fn test_implicit_and_hidden_properties() {
        let handler = PackageReferenceHandler::new();
        let mut properties = IndexMap::new();
        properties.insert("IsImplicitlyDefined".to_string(), "True".to_string());
        properties.insert("Visible".to_string(), "false".to_string());
        let model = handler
            .create_model(&net8(), "NETStandard.Library", None, &properties)
            .unwrap();
        assert!(model.implicit());
        assert!(!model.visible());
    }

    #[test]
    fn test_full_replace_reconciliation() {
        let handler = PackageReferenceHandler::new();
        let tf = net8();

        // Previously holding {P1, P3}
        let initial = RuleUpdate::full("PackageReference", tf.clone())
            .with_added(RuleItem::new("P1"))
            .with_added(RuleItem::new("P3"));
        let changes = handler.handle(&tf, &[&initial], None);
        let prior = crate::dependency_tree::domain::Snapshot::empty(tf.clone())
            .fold(&[changes], 1);
        assert_eq!(prior.len(), 2);

        // Full update with {P1, P2} -> remove P3, keep P1, add P2
        let update = RuleUpdate::full("PackageReference", tf.clone())
            .with_added(RuleItem::new("P1"))
            .with_added(RuleItem::new("P2"));
        let changes = handler.handle(&tf, &[&update], Some(&prior));

        assert_eq!(changes.removed().len(), 1);
        assert!(changes.removed()[0].as_str().ends_with("/p3"));
        // P1 is unchanged and therefore not re-emitted; P2 is new
        assert_eq!(changes.added().len(), 1);
        assert_eq!(changes.added()[0].original_item_spec(), "P2");
    }

    #[test]
    fn test_malformed_item_isolation() {
        let handler = PackageReferenceHandler::new();
        let tf = net8();

        let update = RuleUpdate::incremental("PackageReference", tf.clone())
            .with_added(RuleItem::new("First"))
            .with_added(RuleItem::new(""))
            .with_added(RuleItem::new("Third"));
        let changes = handler.handle(&tf, &[&update], None);

        assert_eq!(changes.added().len(), 2);
        assert_eq!(changes.added()[0].original_item_spec(), "First");
        assert_eq!(changes.added()[1].original_item_spec(), "Third");
        assert!(changes.removed().is_empty());
    }

    #[test]
    fn test_resolved_update_upgrades_declared_package() {
        let handler = PackageReferenceHandler::new();
        let tf = net8();

        let declare = RuleUpdate::full("PackageReference", tf.clone())
            .with_added(RuleItem::new("Serilog").with_property("Version", "3.1.1"));
        let changes = handler.handle(&tf, &[&declare], None);
        let prior = crate::dependency_tree::domain::Snapshot::empty(tf.clone())
            .fold(&[changes], 1);

        let resolve = RuleUpdate::full("ResolvedPackageReference", tf.clone()).with_added(
            RuleItem::new("/nuget/serilog/3.1.1")
                .with_property("OriginalItemSpec", "Serilog")
                .with_property("Version", "3.1.1"),
        );
        let changes = handler.handle(&tf, &[&resolve], Some(&prior));

        assert!(changes.removed().is_empty());
        assert_eq!(changes.added().len(), 1);
        let model = &changes.added()[0];
        assert!(model.resolved());
        assert_eq!(model.path(), "/nuget/serilog/3.1.1");
        assert_eq!(model.original_item_spec(), "Serilog");
    }

    #[test]
    fn test_resolved_full_update_downgrades_missing_package() {
        let handler = PackageReferenceHandler::new();
        let tf = net8();

        let declare = RuleUpdate::full("PackageReference", tf.clone())
            .with_added(RuleItem::new("Serilog"));
        let resolve = RuleUpdate::full("ResolvedPackageReference", tf.clone()).with_added(
            RuleItem::new("/nuget/serilog/3.1.1").with_property("OriginalItemSpec", "Serilog"),
        );
        let changes = handler.handle(&tf, &[&declare, &resolve], None);
        let prior = crate::dependency_tree::domain::Snapshot::empty(tf.clone())
            .fold(&[changes], 1);

        // A later resolved full update that no longer lists Serilog
        let empty_resolve = RuleUpdate::full("ResolvedPackageReference", tf.clone());
        let changes = handler.handle(&tf, &[&empty_resolve], Some(&prior));

        assert!(changes.removed().is_empty());
        assert_eq!(changes.added().len(), 1);
        assert!(!changes.added()[0].resolved());
        assert!(changes.added()[0].path().is_empty());
    }
}
