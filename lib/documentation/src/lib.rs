//! Documentation projects for the documentation site.
//!
//! - `ProjectMetadata`: one project's name, links and versions
//! - `DocumentationService`: every project by id
//! - `ConfigBinder`: binds a YAML resource onto the service at startup
//!
//! # Binding
//!
//! The resource is flattened to properties and bound with relaxed names, so
//! `sortOrder`, `sort-order` and `sort_order` all reach the same field. The
//! top-level `projects` list and anything named `*ersions` are skipped; project
//! versions come from release data, not from configuration.
//!
//! ```no_run
//! use docsite_documentation::{ConfigBinder, DocumentationService, ResourceLocations};
//!
//! let mut service = DocumentationService::new();
//! ConfigBinder::new(ResourceLocations::default())
//!     .bind("documentation.yml", &mut service)
//!     .expect("documentation.yml binds");
//! ```

pub mod binder;
pub mod error;
pub mod project;
pub mod relaxed;
pub mod service;

pub use binder::{Bindable, ConfigBinder, ResourceLocations};
pub use error::{BindError, BindingFailure};
pub use project::ProjectMetadata;
pub use relaxed::Shape;
pub use service::DocumentationService;
