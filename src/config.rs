//! Model configuration
//!
//! Settings for the first start-up phase ([`crate::TableModel::configure`]).
//! Loaded from JSON; every key is optional.
//!
//! ```json
//! { "database_name": "library.db", "table_name": "books", "row_filter": "live" }
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::store::RowFilter;
use crate::{DEFAULT_TABLE, MEMORY_DATABASE};

/// Settings for a table model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Database file path, or `:memory:`
    pub database_name: String,
    /// Table to bind
    pub table_name: String,
    /// Which rows the store loads
    pub row_filter: RowFilter,
}

impl ModelConfig {
    /// Create a config for a database and table
    pub fn new(database_name: &str, table_name: &str) -> Self {
        Self {
            database_name: database_name.to_string(),
            table_name: table_name.to_string(),
            row_filter: RowFilter::default(),
        }
    }

    /// Parse a config from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Fall back to the in-memory sample database when nothing is configured
    pub fn with_defaults(mut self) -> Self {
        if self.database_name.is_empty() && self.table_name.is_empty() {
            self.database_name = MEMORY_DATABASE.to_string();
            self.table_name = DEFAULT_TABLE.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_applied_when_empty() {
        let config = ModelConfig::default().with_defaults();
        assert_eq!(config.database_name, ":memory:");
        assert_eq!(config.table_name, "books");
        assert_eq!(config.row_filter, RowFilter::Live);
    }

    #[test]
    fn test_defaults_not_applied_when_partial() {
        let config = ModelConfig::new("", "orders").with_defaults();
        assert_eq!(config.database_name, "");
        assert_eq!(config.table_name, "orders");
    }

    #[test]
    fn test_from_json_str() {
        let config = ModelConfig::from_json_str(
            r#"{"database_name": "library.db", "row_filter": "deleted"}"#,
        ).unwrap();
        assert_eq!(config.database_name, "library.db");
        assert_eq!(config.table_name, "");
        assert_eq!(config.row_filter, RowFilter::Deleted);

        assert!(ModelConfig::from_json_str(r#"{"row_filter": "sometimes"}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("model.json");
        std::fs::write(&path, r#"{"table_name": "books", "row_filter": "all"}"#).unwrap();

        let config = ModelConfig::from_file(&path).unwrap();
        assert_eq!(config.table_name, "books");
        assert_eq!(config.row_filter, RowFilter::All);

        let missing = ModelConfig::from_file(&temp_dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }
}
