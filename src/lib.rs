//! # tablemodel
//!
//! An editable, role-keyed item model over a relational table.
//!
//! ## Features
//!
//! - Role table built from the bound table's columns (role 0 is the checkbox)
//! - Commit-on-field-change edits
//! - Checkbox selection with bulk remove and recover
//! - Soft delete through a `deleted_at` timestamp column
//! - SQLite row store, or any other [`Store`] implementation
//!
//! ## Example
//!
//! ```no_run
//! use tablemodel::{ModelConfig, TableModel, Value};
//!
//! let mut model = TableModel::sqlite(&ModelConfig::default());
//! model.complete().unwrap();
//!
//! let row = model.add().unwrap();
//! let title = model.role_names().role("title").unwrap();
//! model.set(row, title, Value::from("Dune"));
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod store;

// Re-export main types
pub use config::ModelConfig;
pub use database::models::{Field, Record, RowState, Value};
pub use error::{BindError, ConfigError, InsertError, RecoverError, Result, SelectError, StoreError};
pub use model::{ModelEvent, RoleMap, SelectionSet, SharedSelection, TableModel};
pub use store::{RowFilter, SqliteStore, Store};

/// Role reserved for the checkbox (selection) pseudo-field
pub const CHECKED_ROLE: i32 = 0;

/// Name of the checkbox role
pub const CHECKED_ROLE_NAME: &str = "checkState";

/// Reserved row state column
pub const STATE_FIELD: &str = "state";

/// Reserved soft delete column
pub const DELETED_AT_FIELD: &str = "deleted_at";

/// Database name that selects an in-memory database
pub const MEMORY_DATABASE: &str = ":memory:";

/// Table bound when neither database nor table is configured
pub const DEFAULT_TABLE: &str = "books";
