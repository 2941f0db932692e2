//! Centralized server configuration.
//!
//! Configuration is layered with the `config` crate, lowest precedence first:
//!
//! 1. built-in defaults (serde defaults on each field)
//! 2. `DOCSITE__`-prefixed environment variables, `__` between path segments
//!    (`DOCSITE__GITHUB__CLIENT_ID`)
//! 3. `--key=value` startup arguments, in order, later ones winning
//!
//! See [`GitHubConfig`] for the OAuth application settings.

use config::{Config, ConfigError, Environment};
use docsite_connect::GitHubConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// GitHub OAuth application configuration.
    pub github: GitHubConfig,

    /// Page rendering flags.
    #[serde(default)]
    pub template: TemplateConfig,

    /// Where documentation project metadata is loaded from.
    #[serde(default)]
    pub documentation: DocumentationConfig,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session duration in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Interval between expired-session purges, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_session_duration_minutes() -> i64 {
    30
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

/// HTML dialect the pages are rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateMode {
    /// Strict HTML5.
    #[default]
    Html5,
    /// HTML5 served to legacy parsers: void elements are self-closed.
    LegacyHtml5,
    /// XHTML served as `application/xhtml+xml`.
    Xhtml,
}

/// Page rendering flags.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub mode: TemplateMode,

    /// Render each page once and serve the cached result.
    #[serde(default = "default_template_cache")]
    pub cache: bool,
}

fn default_template_cache() -> bool {
    true
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            mode: TemplateMode::default(),
            cache: default_template_cache(),
        }
    }
}

/// Documentation metadata location.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentationConfig {
    /// Directories searched, in order, for the resource.
    #[serde(default = "default_search_path")]
    pub search_path: Vec<PathBuf>,

    /// Resource file name.
    #[serde(default = "default_resource")]
    pub resource: String,
}

fn default_search_path() -> Vec<PathBuf> {
    vec![PathBuf::from("config"), PathBuf::from(".")]
}

fn default_resource() -> String {
    "documentation.yml".to_string()
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            search_path: default_search_path(),
            resource: default_resource(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the process environment and `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn load(overrides: &[(String, String)]) -> Result<Self, ConfigError> {
        Self::load_from(None, overrides)
    }

    /// Loads configuration from an explicit environment (or the process
    /// environment when `None`) and `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn load_from(
        environment: Option<HashMap<String, String>>,
        overrides: &[(String, String)],
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(
            Environment::with_prefix("DOCSITE")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("documentation.search_path")
                .try_parsing(true)
                .source(environment),
        );
        for (key, value) in overrides {
            builder = builder.set_override(key.as_str(), value.as_str())?;
        }
        builder.build()?.try_deserialize()
    }
}
