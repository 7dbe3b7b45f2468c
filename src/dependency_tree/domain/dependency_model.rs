use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::TargetFramework;
use crate::shared::error::DepTreeError;
use crate::shared::Result;

/// Maximum length for an original item spec (sanity limit)
const MAX_ITEM_SPEC_LENGTH: usize = 1024;

/// Category tag identifying which rule handler produced a dependency
/// (e.g. "Project", "Package", "Assembly").
///
/// Provider types are a closed set supplied by the registered handlers,
/// so they are plain static strings rather than validated owned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderType(&'static str);

impl ProviderType {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a dependency within one target framework.
///
/// Derived from target framework + provider type + the normalized original
/// item spec, so re-adding the same item replaces rather than duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyId(String);

impl DependencyId {
    pub fn new(
        target_framework: &TargetFramework,
        provider_type: ProviderType,
        original_item_spec: &str,
    ) -> Self {
        // Item specs are paths or package ids; both compare
        // case-insensitively in MSBuild evaluation.
        Self(format!(
            "{}/{}/{}",
            target_framework,
            provider_type,
            original_item_spec.to_ascii_lowercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DependencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable value describing one dependency tracked by the tree.
///
/// A model is produced by exactly one rule handler and never mutated after
/// construction; updates replace the whole value in the owning snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyModel {
    id: DependencyId,
    provider_type: ProviderType,
    original_item_spec: String,
    path: String,
    caption: String,
    resolved: bool,
    implicit: bool,
    visible: bool,
    flags: BTreeSet<String>,
    properties: IndexMap<String, String>,
}

impl DependencyModel {
    /// Creates an unresolved, visible model with no path and a caption
    /// defaulting to the item spec. Refine with the `with_*` builders.
    pub fn new(
        target_framework: &TargetFramework,
        provider_type: ProviderType,
        original_item_spec: impl Into<String>,
    ) -> Result<Self> {
        let original_item_spec = original_item_spec.into();

        if original_item_spec.trim().is_empty() {
            return Err(DepTreeError::InvalidItemSpec {
                value: original_item_spec,
                reason: "item spec cannot be empty".to_string(),
            }
            .into());
        }

        if original_item_spec.len() > MAX_ITEM_SPEC_LENGTH {
            return Err(DepTreeError::InvalidItemSpec {
                value: original_item_spec.clone(),
                reason: format!(
                    "item spec is too long ({} bytes). Maximum allowed: {} bytes",
                    original_item_spec.len(),
                    MAX_ITEM_SPEC_LENGTH
                ),
            }
            .into());
        }

        let id = DependencyId::new(target_framework, provider_type, &original_item_spec);
        let caption = original_item_spec.clone();

        Ok(Self {
            id,
            provider_type,
            original_item_spec,
            path: String::new(),
            caption,
            resolved: false,
            implicit: false,
            visible: true,
            flags: BTreeSet::new(),
            properties: IndexMap::new(),
        })
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_resolved(mut self, resolved: bool) -> Self {
        self.resolved = resolved;
        self
    }

    pub fn with_implicit(mut self, implicit: bool) -> Self {
        self.implicit = implicit;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: IndexMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> &DependencyId {
        &self.id
    }

    pub fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    pub fn original_item_spec(&self) -> &str {
        &self.original_item_spec
    }

    /// Resolved/canonical location; empty while the dependency is unresolved.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn resolved(&self) -> bool {
        self.resolved
    }

    pub fn implicit(&self) -> bool {
        self.implicit
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }
}
