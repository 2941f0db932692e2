//! The documentation service: every known documentation project by id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::binder::Bindable;
use crate::project::ProjectMetadata;
use crate::relaxed::{Shape, normalize};

/// Documentation projects keyed by project id.
///
/// Serializes as a plain map so a configuration resource can describe it
/// directly:
///
/// ```yaml
/// spring-framework:
///   name: Spring Framework
///   sortOrder: 1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentationService {
    projects: BTreeMap<String, ProjectMetadata>,
}

impl DocumentationService {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a project.
    pub fn insert_project(&mut self, id: impl Into<String>, project: ProjectMetadata) {
        self.projects.insert(id.into(), project);
    }

    /// Looks a project up by id.
    ///
    /// Exact ids win; otherwise ids are compared relaxed, so `someLib`,
    /// `somelib` and `some-lib` find the same project.
    #[must_use]
    pub fn project(&self, id: &str) -> Option<&ProjectMetadata> {
        self.projects.get(id).or_else(|| {
            let wanted = normalize(id);
            self.projects
                .iter()
                .find(|(key, _)| normalize(key) == wanted)
                .map(|(_, project)| project)
        })
    }

    /// Records the released versions of a project.
    ///
    /// Versions come from the project's release feed, never from the
    /// configuration resource. Returns `false` if the project is unknown.
    pub fn register_versions(&mut self, id: &str, versions: Vec<String>) -> bool {
        let key = if self.projects.contains_key(id) {
            Some(id.to_string())
        } else {
            let wanted = normalize(id);
            self.projects
                .keys()
                .find(|key| normalize(key) == wanted)
                .cloned()
        };

        match key.and_then(|key| self.projects.get_mut(&key)) {
            Some(project) => {
                project.versions = versions;
                true
            }
            None => false,
        }
    }

    /// Returns the project ids, sorted.
    pub fn project_ids(&self) -> impl Iterator<Item = &str> {
        self.projects.keys().map(String::as_str)
    }

    /// Returns the projects in listing order: by sort order, then by id.
    /// Projects without a sort order come last.
    #[must_use]
    pub fn projects(&self) -> Vec<(&str, &ProjectMetadata)> {
        let mut projects: Vec<(&str, &ProjectMetadata)> = self
            .projects
            .iter()
            .map(|(id, project)| (id.as_str(), project))
            .collect();
        projects.sort_by_key(|(id, project)| (project.sort_order.unwrap_or(u32::MAX), *id));
        projects
    }

    /// Returns the number of projects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Returns true if there are no projects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl Bindable for DocumentationService {
    fn shape(&self) -> Shape {
        Shape::map(Shape::of(&ProjectMetadata::default()))
    }
}
