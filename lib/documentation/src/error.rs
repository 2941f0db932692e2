//! Error types for the documentation crate.

use std::fmt;
use std::path::PathBuf;

/// One property that could not be bound onto the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingFailure {
    /// The property key as it appeared in the resource, e.g. `someLib.sortOrder`.
    /// Empty when the failure could not be pinned to a single property.
    pub key: String,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for BindingFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.key, self.message)
        }
    }
}

/// Errors from binding a configuration resource onto a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The resource is not in any directory on the search path.
    ResourceNotFound {
        resource: String,
        searched: Vec<PathBuf>,
    },
    /// The resource exists but is not valid YAML.
    Parse { path: PathBuf, reason: String },
    /// One or more properties could not be bound.
    Binding {
        resource: String,
        failures: Vec<BindingFailure>,
    },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceNotFound { resource, searched } => {
                let searched: Vec<String> =
                    searched.iter().map(|p| p.display().to_string()).collect();
                write!(
                    f,
                    "resource '{resource}' not found (searched: {})",
                    searched.join(", ")
                )
            }
            Self::Parse { path, reason } => {
                write!(f, "failed to parse {}: {reason}", path.display())
            }
            Self::Binding { resource, failures } => {
                let failures: Vec<String> = failures.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "errors binding {resource}: [{}]",
                    failures.join("; ")
                )
            }
        }
    }
}

impl std::error::Error for BindError {}
