use crate::shared::error::DepTreeError;
use crate::shared::Result;

/// Maximum length for a target framework moniker (sanity limit)
const MAX_TARGET_FRAMEWORK_LENGTH: usize = 64;

/// NewType wrapper for a target framework moniker with validation.
///
/// A target framework identifies one build-configuration axis (e.g.
/// "net6.0", "net8.0", "netstandard2.0") for which a separate dependency
/// set is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetFramework(String);

impl TargetFramework {
    pub fn new(moniker: impl Into<String>) -> Result<Self> {
        let moniker = moniker.into();

        if moniker.trim().is_empty() {
            return Err(DepTreeError::InvalidTargetFramework {
                value: moniker,
                reason: "moniker cannot be empty".to_string(),
            }
            .into());
        }

        if moniker.len() > MAX_TARGET_FRAMEWORK_LENGTH {
            return Err(DepTreeError::InvalidTargetFramework {
                value: moniker.clone(),
                reason: format!(
                    "moniker is too long ({} bytes). Maximum allowed: {} bytes",
                    moniker.len(),
                    MAX_TARGET_FRAMEWORK_LENGTH
                ),
            }
            .into());
        }

        // Monikers are lowercase alphanumerics plus dots and hyphens
        // (e.g. "net8.0", "net8.0-windows", "netstandard2.0").
        if !moniker
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
        {
            return Err(DepTreeError::InvalidTargetFramework {
                value: moniker,
                reason: "moniker may only contain lowercase alphanumerics, dots, and hyphens"
                    .to_string(),
            }
            .into());
        }

        Ok(Self(moniker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
