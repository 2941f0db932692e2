//! Relaxed property names.
//!
//! Configuration authors write `siteUrl`, `site-url`, `site_url` or `SITE_URL`
//! interchangeably. Before binding, each key is resolved against the shape of
//! the target so that it names the target's actual fields.

use serde::Serialize;
use serde_json::Value;

/// The field structure of a binding target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Named fields.
    Struct(Vec<(String, Shape)>),
    /// Free-form keys; segments are kept verbatim.
    Map(Box<Shape>),
    /// Indexed elements.
    List(Box<Shape>),
    /// A leaf value.
    Scalar,
    /// Unknown structure; everything below is kept verbatim.
    Any,
}

impl Shape {
    /// Derives a shape from how `value` serializes.
    ///
    /// Fields must serialize even when empty (no `skip_serializing_if`) to
    /// show up here.
    pub fn of<T: Serialize>(value: &T) -> Self {
        serde_json::to_value(value)
            .map(|value| Self::from_value(&value))
            .unwrap_or(Self::Any)
    }

    /// A map whose values all have the shape `values`.
    #[must_use]
    pub fn map(values: Shape) -> Self {
        Self::Map(Box::new(values))
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self::Struct(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), Self::from_value(value)))
                    .collect(),
            ),
            Value::Array(items) => {
                Self::List(Box::new(items.first().map_or(Self::Any, Self::from_value)))
            }
            _ => Self::Scalar,
        }
    }

    fn field(&self, segment: &str) -> Option<(&str, &Shape)> {
        match self {
            Self::Struct(fields) => {
                let wanted = normalize(segment);
                fields
                    .iter()
                    .find(|(name, _)| normalize(name) == wanted)
                    .map(|(name, shape)| (name.as_str(), shape))
            }
            _ => None,
        }
    }
}

/// Canonical form for relaxed comparison: lowercase, no `-` or `_`.
pub(crate) fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Splits `versions[0][1]` into `("versions", "[0][1]")`.
pub(crate) fn split_indices(segment: &str) -> (&str, &str) {
    match segment.find('[') {
        Some(at) => segment.split_at(at),
        None => (segment, ""),
    }
}

/// Resolves a dotted property key against `shape`.
///
/// Struct segments are replaced by the matching field name. Map keys and
/// segments with no matching field are kept as written.
#[must_use]
pub fn resolve_key(key: &str, shape: &Shape) -> String {
    let mut current = Some(shape);
    let mut resolved = Vec::new();

    for segment in key.split('.') {
        let (name, indices) = split_indices(segment);

        let (name, next) = match current {
            Some(Shape::Map(values)) => (name, Some(values.as_ref())),
            Some(shape) => match shape.field(name) {
                Some((field, field_shape)) => (field, Some(field_shape)),
                None => (name, None),
            },
            None => (name, None),
        };
        resolved.push(format!("{name}{indices}"));

        current = next;
        for _ in indices.matches('[') {
            current = match current {
                Some(Shape::List(items)) => Some(items.as_ref()),
                _ => None,
            };
        }
    }

    resolved.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Default, Serialize)]
    struct Link {
        display_text: Option<String>,
    }

    #[derive(Default, Serialize)]
    struct Project {
        site_url: Option<String>,
        sort_order: Option<u32>,
        links: Vec<Link>,
    }

    fn project_map() -> Shape {
        Shape::map(Shape::of(&Project {
            links: vec![Link::default()],
            ..Project::default()
        }))
    }

    #[test]
    fn normalize_ignores_case_and_delimiters() {
        assert_eq!(normalize("siteUrl"), "siteurl");
        assert_eq!(normalize("site-url"), "siteurl");
        assert_eq!(normalize("SITE_URL"), "siteurl");
    }

    #[test]
    fn struct_fields_resolve_relaxed() {
        let shape = project_map();
        assert_eq!(resolve_key("someLib.siteUrl", &shape), "someLib.site_url");
        assert_eq!(resolve_key("someLib.sort-order", &shape), "someLib.sort_order");
        assert_eq!(resolve_key("someLib.SORT_ORDER", &shape), "someLib.sort_order");
    }

    #[test]
    fn map_keys_are_kept_verbatim() {
        let shape = project_map();
        assert_eq!(resolve_key("Some-Lib.siteUrl", &shape), "Some-Lib.site_url");
    }

    #[test]
    fn list_indices_descend_into_elements() {
        let shape = project_map();
        assert_eq!(
            resolve_key("someLib.links[0].displayText", &shape),
            "someLib.links[0].display_text"
        );
    }

    #[test]
    fn unknown_fields_and_their_children_are_kept() {
        let shape = project_map();
        assert_eq!(
            resolve_key("someLib.extra.siteUrl", &shape),
            "someLib.extra.siteUrl"
        );
    }

    #[test]
    fn shape_of_map_value_is_struct_of_its_entries() {
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1);
        assert_eq!(
            Shape::of(&map),
            Shape::Struct(vec![("a".to_string(), Shape::Scalar)])
        );
    }

    #[test]
    fn split_indices_separates_subscripts() {
        assert_eq!(split_indices("versions[0][1]"), ("versions", "[0][1]"));
        assert_eq!(split_indices("name"), ("name", ""));
    }
}
