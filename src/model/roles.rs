//! Role table for the bound record layout
//!
//! Role 0 is the checkbox pseudo-field. Roles `1..=N` address columns
//! `0..N` in declaration order. The table is rebuilt whenever the bound
//! table's columns change.

use std::collections::HashMap;

use crate::{CHECKED_ROLE, CHECKED_ROLE_NAME};

/// Bidirectional mapping between role ids and field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMap {
    /// Field name per role id (index = role)
    names: Vec<String>,
}

impl RoleMap {
    /// Build the role table for a record layout
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        let names = std::iter::once(CHECKED_ROLE_NAME.to_string())
            .chain(columns.iter().map(|c| c.as_ref().to_string()))
            .collect();
        Self { names }
    }

    /// Return the field name for a role
    pub fn name(&self, role: i32) -> Option<&str> {
        usize::try_from(role)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    /// Return the role for a field name
    ///
    /// Field names are matched exactly. The checkbox role is found by its
    /// name like any other.
    pub fn role(&self, name: &str) -> Option<i32> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| i32::try_from(i).ok())
    }

    /// Return the column addressed by a role, `None` for the checkbox role
    /// and for unknown roles
    pub fn column(&self, role: i32) -> Option<usize> {
        if role == CHECKED_ROLE {
            return None;
        }
        self.name(role)?;
        usize::try_from(role - 1).ok()
    }

    /// Number of roles, including the checkbox role
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: the checkbox role is always present
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(role, name)` pairs in role order
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (i as i32, n.as_str()))
    }

    /// Copy the table into a map keyed by role, the shape UI binding
    /// layers usually expect
    pub fn to_hash_map(&self) -> HashMap<i32, String> {
        self.iter().map(|(role, name)| (role, name.to_string())).collect()
    }
}

impl Default for RoleMap {
    fn default() -> Self {
        Self::from_columns::<&str>(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_from_columns() {
        let roles = RoleMap::from_columns(&["id", "title", "deleted_at"]);
        assert_eq!(roles.len(), 4);
        assert_eq!(roles.name(0), Some("checkState"));
        assert_eq!(roles.name(1), Some("id"));
        assert_eq!(roles.name(3), Some("deleted_at"));
        assert_eq!(roles.name(4), None);
        assert_eq!(roles.name(-1), None);
    }

    #[test]
    fn test_reverse_lookup() {
        let roles = RoleMap::from_columns(&["id", "title"]);
        assert_eq!(roles.role("title"), Some(2));
        assert_eq!(roles.role("checkState"), Some(0));
        assert_eq!(roles.role("missing"), None);
    }

    #[test]
    fn test_column_mapping() {
        let roles = RoleMap::from_columns(&["id", "title"]);
        assert_eq!(roles.column(CHECKED_ROLE), None);
        assert_eq!(roles.column(1), Some(0));
        assert_eq!(roles.column(2), Some(1));
        assert_eq!(roles.column(3), None);
    }

    #[test]
    fn test_keys_unique_and_contiguous() {
        let roles = RoleMap::from_columns(&["a", "b", "c", "d"]);
        let map = roles.to_hash_map();
        assert_eq!(map.len(), 5);
        let mut keys: Vec<_> = map.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_default_has_only_checkbox() {
        let roles = RoleMap::default();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles.column(1), None);
    }
}
