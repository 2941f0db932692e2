//! Relaxed binding of a YAML resource onto a target object.
//!
//! The resource is flattened to string properties (`a.b`, `a.list[0]`), a few
//! keys are excluded by convention, the rest are resolved against the target's
//! field names and layered over the target's current values with the `config`
//! crate, which also converts strings to the target's numeric and boolean
//! types.

use config::{Config, ConfigError, File, FileFormat};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{BindError, BindingFailure};
use crate::relaxed::{Shape, resolve_key, split_indices};

/// Top-level key that is never bound, together with everything below it.
const EXCLUDED_ROOT: &str = "projects";

/// Keys with a segment ending in this are never bound.
const EXCLUDED_SUFFIX: &str = "ersions";

/// A type that configuration can be bound onto.
pub trait Bindable: Serialize + DeserializeOwned {
    /// The field structure used to resolve relaxed property names.
    fn shape(&self) -> Shape {
        Shape::of(self)
    }
}

/// Directories searched, in order, for configuration resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocations {
    search_path: Vec<PathBuf>,
}

impl ResourceLocations {
    /// Creates locations searching `search_path` in order.
    #[must_use]
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Returns the search path.
    #[must_use]
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Finds a resource; the first directory that contains it wins.
    ///
    /// # Errors
    ///
    /// Returns `BindError::ResourceNotFound` if no directory contains it.
    pub fn locate(&self, resource: &str) -> Result<PathBuf, BindError> {
        self.search_path
            .iter()
            .map(|dir| dir.join(resource))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| BindError::ResourceNotFound {
                resource: resource.to_string(),
                searched: self.search_path.clone(),
            })
    }
}

impl Default for ResourceLocations {
    fn default() -> Self {
        Self::new(vec![PathBuf::from("config"), PathBuf::from(".")])
    }
}

/// A flattened property.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Property {
    key: String,
    value: String,
}

/// Binds configuration resources onto targets.
#[derive(Debug, Clone, Default)]
pub struct ConfigBinder {
    locations: ResourceLocations,
}

impl ConfigBinder {
    /// Creates a binder that finds resources in `locations`.
    #[must_use]
    pub fn new(locations: ResourceLocations) -> Self {
        Self { locations }
    }

    /// Binds the resource named `resource` onto `target`.
    ///
    /// `target` is only modified when every property binds.
    ///
    /// # Errors
    ///
    /// - `BindError::ResourceNotFound` if the resource is not on the search path
    /// - `BindError::Parse` if it is not valid YAML
    /// - `BindError::Binding` listing every property that does not fit the
    ///   target
    pub fn bind<T: Bindable>(&self, resource: &str, target: &mut T) -> Result<(), BindError> {
        let path = self.locations.locate(resource)?;
        let properties = load_properties(&path)?;
        info!(
            resource,
            path = %path.display(),
            properties = ?properties.iter().map(|p| (&p.key, &p.value)).collect::<Vec<_>>(),
            "binding properties"
        );

        let shape = target.shape();
        let properties: Vec<Property> = properties
            .into_iter()
            .filter(|property| !is_excluded(&property.key))
            .map(|property| Property {
                key: resolve_key(&property.key, &shape),
                value: property.value,
            })
            .collect();
        debug!(resource, count = properties.len(), "resolved bindable properties");

        let unsupported: Vec<BindingFailure> = properties
            .iter()
            .filter_map(|property| {
                unsupported_segment(&property.key).map(|segment| BindingFailure {
                    key: property.key.clone(),
                    message: format!(
                        "unsupported key '{segment}': names may only contain letters, digits, '-' and '_'"
                    ),
                })
            })
            .collect();
        if !unsupported.is_empty() {
            return Err(BindError::Binding {
                resource: resource.to_string(),
                failures: unsupported,
            });
        }

        match layer(target, &properties) {
            Ok(bound) => {
                *target = bound;
                Ok(())
            }
            Err(err) => Err(BindError::Binding {
                resource: resource.to_string(),
                failures: isolate_failures(target, &properties, &err),
            }),
        }
    }
}

/// Loads a YAML file and flattens it to properties.
fn load_properties(path: &Path) -> Result<Vec<Property>, BindError> {
    let parse_error = |e: ConfigError| BindError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let tree: Value = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml))
        .build()
        .map_err(parse_error)?
        .try_deserialize()
        .map_err(parse_error)?;

    let mut properties = Vec::new();
    flatten(&tree, String::new(), &mut properties);
    Ok(properties)
}

fn flatten(value: &Value, key: String, out: &mut Vec<Property>) {
    match value {
        Value::Object(fields) => {
            for (name, child) in fields {
                let child_key = if key.is_empty() {
                    name.clone()
                } else {
                    format!("{key}.{name}")
                };
                flatten(child, child_key, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(item, format!("{key}[{index}]"), out);
            }
        }
        Value::Null => {}
        Value::String(s) => out.push(Property {
            key,
            value: s.clone(),
        }),
        Value::Bool(_) | Value::Number(_) => out.push(Property {
            key,
            value: value.to_string(),
        }),
    }
}

fn is_excluded(key: &str) -> bool {
    let mut segments = key.split('.').map(|segment| split_indices(segment).0);
    if segments.clone().next() == Some(EXCLUDED_ROOT) {
        return true;
    }
    segments.any(|name| name.ends_with(EXCLUDED_SUFFIX))
}

/// The first segment of `key` that cannot be addressed as a property path.
fn unsupported_segment(key: &str) -> Option<&str> {
    key.split('.')
        .map(|segment| split_indices(segment).0)
        .find(|name| {
            name.is_empty()
                || !name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

/// Layers `properties` over the target's current values.
fn layer<T: Bindable>(target: &T, properties: &[Property]) -> Result<T, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(target)?);
    for property in properties {
        builder = builder.set_override(property.key.as_str(), property.value.as_str())?;
    }
    builder.build()?.try_deserialize()
}

/// Pins a failed binding on individual properties.
fn isolate_failures<T: Bindable>(
    target: &T,
    properties: &[Property],
    combined: &ConfigError,
) -> Vec<BindingFailure> {
    let failures: Vec<BindingFailure> = properties
        .iter()
        .filter_map(|property| {
            layer(target, std::slice::from_ref(property))
                .err()
                .map(|err| BindingFailure {
                    key: property.key.clone(),
                    message: err.to_string(),
                })
        })
        .collect();

    if failures.is_empty() {
        vec![BindingFailure {
            key: String::new(),
            message: combined.to_string(),
        }]
    } else {
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::DocumentationService;
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    fn write_resource(dir: &TempDir, name: &str, yaml: &str) {
        fs::write(dir.path().join(name), yaml).expect("write resource");
    }

    fn binder(dir: &TempDir) -> ConfigBinder {
        ConfigBinder::new(ResourceLocations::new(vec![dir.path().to_path_buf()]))
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Settings {
        title: Option<String>,
        page_size: u32,
        enabled: bool,
    }

    impl Bindable for Settings {}

    #[test]
    fn excluded_keys() {
        assert!(is_excluded("projects"));
        assert!(is_excluded("projects[0].name"));
        assert!(is_excluded("projects.someLib.name"));
        assert!(is_excluded("someLib.versions"));
        assert!(is_excluded("someLib.versions[1]"));
        assert!(is_excluded("someLib.supportedVersions"));
        assert!(!is_excluded("someLib.name"));
        assert!(!is_excluded("someLib.projects"));
        assert!(!is_excluded("someLib.VERSIONS"));
    }

    #[test]
    fn unsupported_segments() {
        assert_eq!(unsupported_segment("spring boot.name"), Some("spring boot"));
        assert_eq!(unsupported_segment("someLib.site:url"), Some("site:url"));
        assert_eq!(unsupported_segment("some-lib.sort_order"), None);
        assert_eq!(unsupported_segment("someLib.versions[0]"), None);
    }

    #[test]
    fn project_ids_outside_the_key_grammar_are_reported() {
        let dir = TempDir::new().expect("temp dir");
        write_resource(
            &dir,
            "documentation.yml",
            "spring boot:\n  name: Spring Boot\nsomeLib:\n  name: Some Library\n",
        );

        let mut service = DocumentationService::new();
        let err = binder(&dir)
            .bind("documentation.yml", &mut service)
            .expect_err("space in project id");

        let BindError::Binding { failures, .. } = err else {
            panic!("expected binding error");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].key, "spring boot.name");
        assert!(failures[0].message.contains("unsupported key 'spring boot'"));
        assert!(service.is_empty());
    }

    #[test]
    fn flatten_uses_dots_and_subscripts() {
        let tree = serde_json::json!({
            "a": {"b": "x", "list": [1, true], "empty": null}
        });
        let mut out = Vec::new();
        flatten(&tree, String::new(), &mut out);

        let keys: Vec<&str> = out.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["a.b", "a.list[0]", "a.list[1]"]);
        assert_eq!(out[2].value, "true");
    }

    #[test]
    fn binds_only_non_excluded_keys() {
        let dir = TempDir::new().expect("temp dir");
        write_resource(
            &dir,
            "documentation.yml",
            "projects:\n  - someLib\n  - otherLib\nsomeLib:\n  name: Some Library\n  versions:\n    - 2.0.0\n    - 1.5.0\n",
        );

        let mut service = DocumentationService::new();
        binder(&dir)
            .bind("documentation.yml", &mut service)
            .expect("bind succeeds");

        assert_eq!(service.len(), 1);
        let project = service.project("someLib").expect("someLib bound");
        assert_eq!(project.name.as_deref(), Some("Some Library"));
        assert!(project.versions.is_empty());
        assert!(service.project("projects").is_none());
    }

    #[test]
    fn relaxed_names_and_string_conversion() {
        let dir = TempDir::new().expect("temp dir");
        write_resource(
            &dir,
            "documentation.yml",
            "someLib:\n  site-url: https://example.com/some-lib\n  sortOrder: 3\n",
        );

        let mut service = DocumentationService::new();
        binder(&dir)
            .bind("documentation.yml", &mut service)
            .expect("bind succeeds");

        let project = service.project("someLib").expect("someLib bound");
        assert_eq!(
            project.site_url.as_deref(),
            Some("https://example.com/some-lib")
        );
        assert_eq!(project.sort_order, Some(3));
    }

    #[test]
    fn type_mismatch_is_reported_and_target_untouched() {
        let dir = TempDir::new().expect("temp dir");
        write_resource(
            &dir,
            "documentation.yml",
            "someLib:\n  name: Some Library\n  sortOrder: first\n",
        );

        let mut service = DocumentationService::new();
        let err = binder(&dir)
            .bind("documentation.yml", &mut service)
            .expect_err("sortOrder is not a number");

        match err {
            BindError::Binding { resource, failures } => {
                assert_eq!(resource, "documentation.yml");
                assert_eq!(failures.len(), 1);
                assert!(failures[0].key.ends_with("sort_order"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(service.is_empty());
    }

    #[test]
    fn every_mismatch_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        write_resource(
            &dir,
            "settings.yml",
            "title: Docs\npageSize: lots\nenabled: maybe\n",
        );

        let mut settings = Settings::default();
        let err = binder(&dir)
            .bind("settings.yml", &mut settings)
            .expect_err("two bad values");

        let BindError::Binding { failures, .. } = err else {
            panic!("expected binding error");
        };
        let keys: Vec<&str> = failures.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["enabled", "page_size"]);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn binding_keeps_values_the_resource_does_not_mention() {
        let dir = TempDir::new().expect("temp dir");
        write_resource(&dir, "settings.yml", "page-size: 50\n");

        let mut settings = Settings {
            title: Some("Existing".to_string()),
            page_size: 10,
            enabled: true,
        };
        binder(&dir)
            .bind("settings.yml", &mut settings)
            .expect("bind succeeds");

        assert_eq!(settings.title.as_deref(), Some("Existing"));
        assert_eq!(settings.page_size, 50);
        assert!(settings.enabled);
    }

    #[test]
    fn missing_resource_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let mut service = DocumentationService::new();
        let err = binder(&dir)
            .bind("documentation.yml", &mut service)
            .expect_err("nothing on the search path");
        assert!(matches!(err, BindError::ResourceNotFound { .. }));
    }

    #[test]
    fn first_directory_on_search_path_wins() {
        let first = TempDir::new().expect("temp dir");
        let second = TempDir::new().expect("temp dir");
        write_resource(&first, "documentation.yml", "a: 1\n");
        write_resource(&second, "documentation.yml", "a: 2\n");

        let locations = ResourceLocations::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(
            locations.locate("documentation.yml").expect("found"),
            first.path().join("documentation.yml")
        );
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let dir = TempDir::new().expect("temp dir");
        write_resource(&dir, "documentation.yml", "someLib: [unclosed\n");

        let mut service = DocumentationService::new();
        let err = binder(&dir)
            .bind("documentation.yml", &mut service)
            .expect_err("broken yaml");
        assert!(matches!(err, BindError::Parse { .. }));
    }
}
