//! Documentation project metadata.

use serde::{Deserialize, Serialize};

/// Metadata for one documentation project.
///
/// Every field is optional so that a project can be declared by any subset of
/// its properties. URL fields may be patterns containing a `{version}`
/// placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMetadata {
    /// Human-readable project name.
    pub name: Option<String>,
    /// Source repository URL.
    pub repository: Option<String>,
    /// Project home page.
    pub site_url: Option<String>,
    /// Reference documentation URL pattern.
    pub reference_url: Option<String>,
    /// API documentation URL pattern.
    pub api_url: Option<String>,
    /// Position in project listings; unordered projects sort last.
    pub sort_order: Option<u32>,
    /// Released versions, newest first. Never bound from configuration.
    pub versions: Vec<String>,
}

impl ProjectMetadata {
    /// Returns the reference documentation URL for a version.
    #[must_use]
    pub fn reference_url_for(&self, version: &str) -> Option<String> {
        self.reference_url
            .as_deref()
            .map(|pattern| pattern.replace("{version}", version))
    }

    /// Returns the API documentation URL for a version.
    #[must_use]
    pub fn api_url_for(&self, version: &str) -> Option<String> {
        self.api_url
            .as_deref()
            .map(|pattern| pattern.replace("{version}", version))
    }

    /// Returns the newest known version.
    #[must_use]
    pub fn current_version(&self) -> Option<&str> {
        self.versions.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_patterns_substitute_version() {
        let project = ProjectMetadata {
            reference_url: Some("https://docs.example.com/{version}/reference".to_string()),
            api_url: Some("https://docs.example.com/{version}/api".to_string()),
            ..ProjectMetadata::default()
        };
        assert_eq!(
            project.reference_url_for("3.2.0").as_deref(),
            Some("https://docs.example.com/3.2.0/reference")
        );
        assert_eq!(
            project.api_url_for("3.2.0").as_deref(),
            Some("https://docs.example.com/3.2.0/api")
        );
    }

    #[test]
    fn missing_pattern_yields_none() {
        assert!(ProjectMetadata::default().reference_url_for("1.0").is_none());
        assert!(ProjectMetadata::default().current_version().is_none());
    }
}
