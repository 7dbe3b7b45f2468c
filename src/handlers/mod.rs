/// Rule handlers - convert raw evaluation rule updates into typed
/// dependency deltas, one handler per dependency provider type.
pub mod assembly_reference;
pub mod package_reference;
pub mod project_reference;
pub mod registry;
pub mod rule_handler;

pub use assembly_reference::{AssemblyReferenceHandler, ASSEMBLY_PROVIDER};
pub use package_reference::{PackageReferenceHandler, PACKAGE_PROVIDER};
pub use project_reference::{ProjectReferenceHandler, PROJECT_PROVIDER};
pub use registry::RuleHandlerRegistry;
pub use rule_handler::{RootNode, RuleHandler, RuleItem, RuleUpdate, ORIGINAL_ITEM_SPEC_PROPERTY};

/// Extensions stripped when deriving a display caption from a path-like
/// item spec. Dotted assembly names ("System.Memory") keep their suffix.
const CAPTION_EXTENSIONS: &[&str] = &[".csproj", ".vbproj", ".fsproj", ".dll", ".exe", ".winmd"];

pub(crate) fn file_stem_caption(item_spec: &str) -> String {
    let name = item_spec
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(item_spec);
    for extension in CAPTION_EXTENSIONS {
        if name.len() > extension.len() && name.to_ascii_lowercase().ends_with(extension) {
            return name[..name.len() - extension.len()].to_string();
        }
    }
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_caption_known_extension() {
        assert_eq!(file_stem_caption("src/Core.csproj"), "Core");
        assert_eq!(file_stem_caption(r"lib\Json.dll"), "Json");
    }

    #[test]
    fn test_file_stem_caption_keeps_dotted_names() {
        assert_eq!(file_stem_caption("System.Memory"), "System.Memory");
    }
}
