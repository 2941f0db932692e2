//! Granted roles.
//!
//! Roles are authority names carrying the conventional `ROLE_` prefix. A
//! user signed in through an external provider is granted exactly
//! `ROLE_USER`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const ROLE_PREFIX: &str = "ROLE_";

/// A single granted authority, always stored with its `ROLE_` prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Creates a role, adding the `ROLE_` prefix when it is missing.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        if name.starts_with(ROLE_PREFIX) {
            Self(name.to_string())
        } else {
            Self(format!("{ROLE_PREFIX}{}", name.to_ascii_uppercase()))
        }
    }

    /// The role granted to every signed-in user.
    #[must_use]
    pub fn user() -> Self {
        Self(format!("{ROLE_PREFIX}USER"))
    }

    /// Returns the full authority name, e.g. `ROLE_USER`.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of roles granted to an authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    roles: BTreeSet<Role>,
}

impl RoleSet {
    /// Creates an empty role set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates the role set of a regular signed-in user: `{ROLE_USER}`.
    #[must_use]
    pub fn user() -> Self {
        Self {
            roles: BTreeSet::from([Role::user()]),
        }
    }

    /// Parses a comma-separated authority list such as `"ROLE_USER, ROLE_EDITOR"`.
    ///
    /// Blank entries are skipped.
    #[must_use]
    pub fn from_authorities(list: &str) -> Self {
        let roles = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Role::new)
            .collect();
        Self { roles }
    }

    /// Returns true if the given role is granted.
    #[must_use]
    pub fn contains(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Returns true if no role is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns the number of granted roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Iterates the roles in authority-name order.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_adds_prefix() {
        assert_eq!(Role::new("user"), Role::user());
        assert_eq!(Role::new("ROLE_USER").authority(), "ROLE_USER");
    }

    #[test]
    fn user_role_set_has_exactly_role_user() {
        let roles = RoleSet::user();
        assert_eq!(roles.len(), 1);
        assert!(roles.contains(&Role::user()));
    }

    #[test]
    fn none_is_empty() {
        assert!(RoleSet::none().is_empty());
    }

    #[test]
    fn from_authorities_parses_comma_separated_list() {
        let roles = RoleSet::from_authorities("ROLE_USER, ROLE_EDITOR,,");
        assert_eq!(roles.len(), 2);
        assert!(roles.contains(&Role::user()));
        assert!(roles.contains(&Role::new("editor")));
    }

    #[test]
    fn from_authorities_deduplicates() {
        let roles = RoleSet::from_authorities("ROLE_USER,ROLE_USER");
        assert_eq!(roles, RoleSet::user());
    }

    #[test]
    fn role_serialization_format() {
        let json = serde_json::to_string(&Role::user()).expect("serialize");
        assert_eq!(json, "\"ROLE_USER\"");
    }
}
