//! Row stores
//!
//! The table model never talks to a database directly. It wraps a [`Store`]:
//! a cached, positional view of one table with commit-on-write edits.

pub mod sqlite;

use serde::{Deserialize, Serialize};
use crate::database::{Record, Value};
use crate::error::Result;

pub use sqlite::SqliteStore;

/// Which rows a store loads, based on the soft delete column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowFilter {
    /// Rows whose deletion timestamp is NULL
    #[default]
    Live,
    /// Soft-deleted rows only
    Deleted,
    /// Every row
    All,
}

/// Relational table abstraction consumed by the table model
///
/// Rows are addressed by their position in the loaded view, columns by their
/// position in the record layout.
pub trait Store {
    /// Identifier of the open database
    fn database_name(&self) -> &str;

    /// Open (or reopen) a database by name, dropping the loaded rows
    fn open_database(&mut self, name: &str) -> Result<()>;

    /// Table names in the catalog
    fn tables(&self) -> Result<Vec<String>>;

    /// Check whether a table is in the catalog (case-insensitive)
    fn table_exists(&self, name: &str) -> bool {
        self.tables()
            .map(|tables| tables.iter().any(|t| t.eq_ignore_ascii_case(name)))
            .unwrap_or(false)
    }

    /// Switch to another table and read its record layout
    fn set_table(&mut self, name: &str) -> Result<()>;

    /// Name of the current table, empty if none
    fn table_name(&self) -> &str;

    /// Column names of the current table in declaration order
    fn columns(&self) -> &[String];

    /// Re-read the rows of the current table
    fn reload(&mut self) -> Result<()>;

    /// Number of loaded rows
    fn row_count(&self) -> usize;

    /// Text of the most recent store failure, empty if none
    fn last_error_text(&self) -> String;

    /// Insert a row writing only the generated fields of `record`
    ///
    /// Returns the position the new row was placed at.
    fn insert_row_with_defaults(&mut self, row: usize, record: &Record) -> Result<usize>;

    /// Remove a row from the table
    fn remove_row(&mut self, row: usize) -> Result<()>;

    /// Value shown for a cell, `None` outside the loaded rows
    fn display_value(&self, row: usize, column: usize) -> Option<Value>;

    /// Write a cell immediately
    fn set_edit_value(&mut self, row: usize, column: usize, value: Value) -> Result<()>;
}
