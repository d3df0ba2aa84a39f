//! Error types for the table model and its stores

use thiserror::Error;

/// Error raised by a row store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database operation failed
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// No table is bound to the store
    #[error("No table selected")]
    NoTable,

    /// Table is not present in the catalog
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Table has neither a primary key nor a usable rowid
    #[error("Table '{0}' has no primary key or rowid to address rows by")]
    NoRowKey(String),

    /// Row index outside the loaded rows
    #[error("Row out of range: {0}")]
    RowOutOfRange(usize),

    /// Column index outside the record layout
    #[error("Column out of range: {0}")]
    ColumnOutOfRange(usize),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failure to bind a table to the model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The table is not in the store's catalog
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The table exists but could not be loaded
    #[error("Load failed: {0}")]
    LoadFailed(String),
}

/// Failure to reload the bound table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The bound table disappeared from the catalog
    #[error("{0}")]
    TableMissing(String),

    /// The reload query failed
    #[error("{0}")]
    QueryFailed(String),
}

/// Failure to insert a row
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// The store rejected the new row
    #[error("Insert record failed: {message} (table '{table}' in '{database}')")]
    StoreRejected {
        message: String,
        table: String,
        database: String,
    },
}

/// Failure to recover a soft-deleted row
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecoverError {
    /// The bound table has no soft delete column
    #[error("No such column: {0}")]
    NoSuchColumn(String),

    /// Row index outside the loaded rows
    #[error("Invalid row: {0}")]
    InvalidRow(usize),

    /// The store refused the write
    #[error("Recover failed: {0}")]
    StoreRejected(String),
}

/// Failure to load configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration is not valid JSON for [`crate::ModelConfig`]
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}
