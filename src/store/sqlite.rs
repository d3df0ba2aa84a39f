//! SQLite row store
//!
//! Caches the rows of one table and writes every edit straight through to the
//! database. Tables with a `deleted_at` column are soft-deleted and filtered
//! by [`RowFilter`]; other tables are deleted physically.

use rusqlite::Connection;
use crate::database::queries::{self, RawRow, TableLayout};
use crate::database::{Database, Record, Value};
use crate::error::{StoreError, Result};
use crate::{DELETED_AT_FIELD, MEMORY_DATABASE};
use super::{RowFilter, Store};

/// [`Store`] backed by a SQLite database
#[derive(Default)]
pub struct SqliteStore {
    /// Open database, if any
    db: Option<Database>,
    /// Current table and its record layout
    layout: Option<TableLayout>,
    /// Loaded rows
    rows: Vec<RawRow>,
    /// Row visibility policy
    filter: RowFilter,
    /// Text of the last failure
    last_error: String,
}

impl SqliteStore {
    /// Create a store with no database open
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with no database open and the given row filter
    pub fn with_filter(filter: RowFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Open a database by name
    ///
    /// `:memory:` gives an in-memory database holding the sample tables.
    pub fn open(name: &str) -> Result<Self> {
        let mut store = Self::new();
        store.open_database(name)?;
        Ok(store)
    }

    /// Wrap an already open database
    pub fn from_database(db: Database) -> Self {
        Self {
            db: Some(db),
            ..Self::default()
        }
    }

    /// Get the row filter
    pub fn filter(&self) -> RowFilter {
        self.filter
    }

    /// Set the row filter, applied on the next reload
    pub fn set_filter(&mut self, filter: RowFilter) {
        self.filter = filter;
    }

    /// Get the underlying database
    pub fn database(&self) -> Result<&Database> {
        self.db.as_ref().ok_or_else(|| StoreError::DatabaseError("Database not open".to_string()))
    }

    fn connection(&self) -> Result<&Connection> {
        self.database()?.connection()
    }

    fn layout(&self) -> Result<&TableLayout> {
        self.layout.as_ref().ok_or(StoreError::NoTable)
    }

    fn row(&self, row: usize) -> Result<&RawRow> {
        self.rows.get(row).ok_or(StoreError::RowOutOfRange(row))
    }

    /// Record a failure as the last error
    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            tracing::warn!(target: "tablemodel::store", "{}", e);
            self.last_error = e.to_string();
        }
        result
    }

    fn try_open_database(&mut self, name: &str) -> Result<()> {
        let db = if name == MEMORY_DATABASE {
            Database::create_sample()?
        } else {
            Database::open(name)?
        };

        tracing::debug!(target: "tablemodel::store", "opened database '{}'", name);
        self.db = Some(db);
        self.layout = None;
        self.rows.clear();
        Ok(())
    }

    fn try_set_table(&mut self, name: &str) -> Result<()> {
        let conn = self.connection()?;
        let table = queries::list_tables(conn)?
            .into_iter()
            .find(|t| t.eq_ignore_ascii_case(name))
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;
        let layout = queries::table_layout(conn, &table)?;

        tracing::debug!(target: "tablemodel::store", "table '{}' keyed by {:?}", table, layout.key);
        self.layout = Some(layout);
        self.rows.clear();
        Ok(())
    }

    fn try_reload(&mut self) -> Result<()> {
        let conn = self.connection()?;
        let layout = queries::table_layout(conn, &self.layout()?.table)?;

        let condition = if layout.columns.iter().any(|c| c == DELETED_AT_FIELD) {
            let column = queries::quote_identifier(DELETED_AT_FIELD);
            match self.filter {
                RowFilter::Live => Some(format!("{} IS NULL", column)),
                RowFilter::Deleted => Some(format!("{} IS NOT NULL", column)),
                RowFilter::All => None,
            }
        } else {
            None
        };

        let rows = queries::select_rows(conn, &layout, condition.as_deref())?;

        self.layout = Some(layout);
        self.rows = rows;
        Ok(())
    }

    fn try_insert(&mut self, row: usize, record: &Record) -> Result<usize> {
        let raw = queries::insert_record(self.connection()?, self.layout()?, record)?;

        let position = row.min(self.rows.len());
        self.rows.insert(position, raw);
        Ok(position)
    }

    fn try_remove(&mut self, row: usize) -> Result<()> {
        let layout = self.layout()?;
        let key = &self.row(row)?.key;
        let conn = self.connection()?;

        if layout.columns.iter().any(|c| c == DELETED_AT_FIELD) {
            let timestamp = queries::now_timestamp();
            let raw = queries::soft_delete_row(conn, layout, key, DELETED_AT_FIELD, &timestamp)?;
            if self.filter == RowFilter::Live {
                self.rows.remove(row);
            } else {
                self.rows[row] = raw;
            }
        } else {
            queries::delete_row(conn, layout, key)?;
            self.rows.remove(row);
        }
        Ok(())
    }

    fn try_set_edit_value(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let layout = self.layout()?;
        let key = &self.row(row)?.key;
        let name = layout.columns.get(column).ok_or(StoreError::ColumnOutOfRange(column))?;

        // Cache what SQLite stored, after type affinity
        let raw = queries::update_cell(self.connection()?, layout, key, name, &value)?;
        self.rows[row] = raw;
        Ok(())
    }
}

impl Store for SqliteStore {
    fn database_name(&self) -> &str {
        self.db.as_ref().map(|db| db.name()).unwrap_or("")
    }

    fn open_database(&mut self, name: &str) -> Result<()> {
        let result = self.try_open_database(name);
        self.track(result)
    }

    fn tables(&self) -> Result<Vec<String>> {
        queries::list_tables(self.connection()?)
    }

    fn set_table(&mut self, name: &str) -> Result<()> {
        let result = self.try_set_table(name);
        self.track(result)
    }

    fn table_name(&self) -> &str {
        self.layout.as_ref().map(|layout| layout.table.as_str()).unwrap_or("")
    }

    fn columns(&self) -> &[String] {
        self.layout.as_ref().map(|layout| layout.columns.as_slice()).unwrap_or(&[])
    }

    fn reload(&mut self) -> Result<()> {
        let result = self.try_reload();
        self.track(result)
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn last_error_text(&self) -> String {
        self.last_error.clone()
    }

    fn insert_row_with_defaults(&mut self, row: usize, record: &Record) -> Result<usize> {
        let result = self.try_insert(row, record);
        self.track(result)
    }

    fn remove_row(&mut self, row: usize) -> Result<()> {
        let result = self.try_remove(row);
        self.track(result)
    }

    fn display_value(&self, row: usize, column: usize) -> Option<Value> {
        self.rows.get(row)?.values.get(column).cloned()
    }

    fn set_edit_value(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let result = self.try_set_edit_value(row, column, value);
        self.track(result)
    }
}
