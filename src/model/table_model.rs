//! Role-keyed table model over a row store
//!
//! [`TableModel`] wraps a [`Store`] and exposes its rows to a UI binding
//! layer: fields are addressed by role, role 0 is a checkbox backed by a
//! shared [`SelectionSet`], and rows are soft-deleted and recovered through
//! the reserved `deleted_at` column.
//!
//! Start-up happens in two phases: [`TableModel::configure`] records names,
//! [`TableModel::complete`] opens the database and binds the table.
//!
//! # Example
//!
//! ```no_run
//! use tablemodel::{ModelConfig, TableModel, CHECKED_ROLE};
//!
//! let mut model = TableModel::sqlite(&ModelConfig::new("library.db", "books"));
//! model.complete().unwrap();
//!
//! model.set(2, CHECKED_ROLE, true.into());
//! model.set(5, CHECKED_ROLE, true.into());
//! assert_eq!(model.remove_selected(), 2);
//! ```

use std::rc::Rc;

use crate::config::ModelConfig;
use crate::database::{Record, RowState, Value};
use crate::error::{BindError, InsertError, RecoverError, SelectError};
use crate::store::{SqliteStore, Store};
use crate::{CHECKED_ROLE, DELETED_AT_FIELD, STATE_FIELD};

use super::events::{Listeners, ModelEvent};
use super::roles::RoleMap;
use super::selection::{SelectionSet, SharedSelection};

const TARGET: &str = "tablemodel::model";

/// Editable, role-keyed model of one table
///
/// Every edit is written to the store immediately. The model is meant to be
/// driven from a single thread.
pub struct TableModel<S: Store> {
    store: S,
    database_name: String,
    table_name: String,
    error_string: String,
    roles: RoleMap,
    selection: SharedSelection,
    listeners: Listeners,
    completed: bool,
}

impl TableModel<SqliteStore> {
    /// Create a configured model over a new SQLite store
    ///
    /// Call [`complete`](Self::complete) to open the database and bind the
    /// table.
    pub fn sqlite(config: &ModelConfig) -> Self {
        let mut model = Self::new(SqliteStore::with_filter(config.row_filter));
        model.configure(config);
        model
    }
}

impl<S: Store> TableModel<S> {
    /// Create an unbound model over `store`
    pub fn new(store: S) -> Self {
        Self {
            store,
            database_name: String::new(),
            table_name: String::new(),
            error_string: String::new(),
            roles: RoleMap::default(),
            selection: SelectionSet::shared(),
            listeners: Listeners::new(),
            completed: false,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Record the database and table to use, without touching the store
    ///
    /// With neither name set, the in-memory sample database and its `books`
    /// table are used.
    pub fn configure(&mut self, config: &ModelConfig) {
        let config = config.clone().with_defaults();
        tracing::debug!(
            target: TARGET,
            "configure database '{}' table '{}'",
            config.database_name,
            config.table_name
        );
        self.database_name = config.database_name;
        self.table_name = config.table_name;
    }

    /// Open the configured database and bind the configured table
    ///
    /// Without a configured database name the store's open database is used.
    pub fn complete(&mut self) -> Result<(), BindError> {
        tracing::debug!(
            target: TARGET,
            "complete database '{}' table '{}'",
            self.database_name,
            self.table_name
        );
        self.completed = true;

        if self.database_name.is_empty() {
            self.database_name = self.store.database_name().to_string();
        } else if !self.store.database_name().eq_ignore_ascii_case(&self.database_name) {
            let name = self.database_name.clone();
            if let Err(e) = self.store.open_database(&name) {
                self.record_error(format!("Can not open database '{}': {}", name, e));
                return Err(BindError::LoadFailed(e.to_string()));
            }
        }

        let table = self.table_name.clone();
        self.bind(&table)
    }

    /// Bind a table and load its rows
    ///
    /// Rebinding the current table (compared trimmed and case-insensitively)
    /// does nothing. An unknown table leaves the model untouched.
    pub fn bind(&mut self, table_name: &str) -> Result<(), BindError> {
        let table = table_name.trim();

        let current = self.store.table_name();
        if !current.is_empty() && current.eq_ignore_ascii_case(table) {
            return Ok(());
        }

        if table.is_empty() || !self.store.table_exists(table) {
            let msg = format!(
                "Can not find table '{}' in '{}'",
                table,
                self.store.database_name()
            );
            self.record_error(msg);
            return Err(BindError::TableNotFound(table.to_string()));
        }

        if let Err(e) = self.store.set_table(table) {
            self.record_error(format!("Can not open table '{}': {}", table, e));
            return Err(BindError::LoadFailed(e.to_string()));
        }

        tracing::debug!(target: TARGET, "bound table '{}'", self.store.table_name());
        self.table_name = self.store.table_name().to_string();
        self.clear_selection();

        let loaded = self.store.reload();
        self.rebuild_roles();
        self.listeners.emit(ModelEvent::TableChanged);

        if let Err(e) = loaded {
            self.record_error(format!("Read record error {}", e));
            return Err(BindError::LoadFailed(e.to_string()));
        }

        self.listeners.emit(ModelEvent::ModelReset);
        Ok(())
    }

    /// Rebuild the role table after the bound table's columns changed
    pub fn schema_changed(&mut self) {
        self.rebuild_roles();
    }

    fn rebuild_roles(&mut self) {
        let roles = RoleMap::from_columns(self.store.columns());
        if roles != self.roles {
            self.roles = roles;
            self.listeners.emit(ModelEvent::RolesChanged);
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Role table of the loaded schema
    pub fn role_names(&self) -> &RoleMap {
        &self.roles
    }

    /// Name of the configured or open database
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Name of the configured or bound table
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Last recorded error, or the store's last error if none was recorded
    pub fn error_string(&self) -> String {
        if self.error_string.is_empty() {
            self.store.last_error_text()
        } else {
            self.error_string.clone()
        }
    }

    /// Number of selected rows
    pub fn selected_row_count(&self) -> usize {
        self.selection.borrow().len()
    }

    /// Number of loaded rows
    pub fn row_count(&self) -> usize {
        self.store.row_count()
    }

    /// Number of columns in the bound table
    pub fn column_count(&self) -> usize {
        self.store.columns().len()
    }

    /// Handle to the selection set
    pub fn selection(&self) -> SharedSelection {
        Rc::clone(&self.selection)
    }

    /// Use a selection set owned elsewhere
    pub fn set_selection(&mut self, selection: SharedSelection) {
        self.selection = selection;
        self.listeners.emit(ModelEvent::SelectedRowsChanged);
    }

    /// The wrapped store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store
    ///
    /// Call [`schema_changed`](Self::schema_changed) after altering the bound
    /// table's columns.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Register an event listener
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ModelEvent) + 'static,
    {
        self.listeners.connect(listener);
    }

    // =========================================================================
    // Cell access
    // =========================================================================

    /// Read a field by role
    ///
    /// The checkbox role yields `Value::Bool`. Out of range rows and unknown
    /// roles yield `Value::Null`.
    pub fn get(&self, row: usize, role: i32) -> Value {
        if row >= self.store.row_count() {
            return Value::Null;
        }

        if role == CHECKED_ROLE {
            return Value::Bool(self.selection.borrow().contains(row));
        }

        self.roles
            .column(role)
            .and_then(|column| self.store.display_value(row, column))
            .unwrap_or_default()
    }

    /// Write a field by role
    ///
    /// The checkbox role selects or deselects the row. Any other role is
    /// written to the store at once. Returns `false` for an out of range row,
    /// an unknown role, or a rejected write.
    pub fn set(&mut self, row: usize, role: i32, value: Value) -> bool {
        if row >= self.store.row_count() {
            return false;
        }

        if role == CHECKED_ROLE {
            self.selection.borrow_mut().set(row, value.to_bool());
            self.listeners.emit(ModelEvent::SelectedRowsChanged);
            self.listeners.emit(ModelEvent::DataChanged { row, role });
            return true;
        }

        let Some(column) = self.roles.column(role) else {
            return false;
        };

        match self.store.set_edit_value(row, column, value) {
            Ok(()) => {
                self.listeners.emit(ModelEvent::DataChanged { row, role });
                true
            }
            Err(e) => {
                tracing::warn!(target: TARGET, "write to row {} role {} failed: {}", row, role, e);
                false
            }
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Reload the bound table
    ///
    /// Fails if the table was dropped from the catalog or the query fails.
    /// A previous error is not cleared on success.
    pub fn select(&mut self) -> Result<(), SelectError> {
        if !self.store.table_exists(&self.table_name) {
            let msg = format!(
                "Can not open table '{}' in '{}'",
                self.table_name,
                self.store.database_name()
            );
            self.record_error(msg.clone());
            return Err(SelectError::TableMissing(msg));
        }

        if let Err(e) = self.store.reload() {
            let msg = format!("Read record error {}", e);
            self.record_error(msg.clone());
            return Err(SelectError::QueryFailed(msg));
        }

        self.clear_selection();
        self.rebuild_roles();
        self.listeners.emit(ModelEvent::ModelReset);
        Ok(())
    }

    /// Same as [`select`](Self::select)
    pub fn refresh(&mut self) -> Result<(), SelectError> {
        self.select()
    }

    /// Append a blank row
    pub fn add(&mut self) -> Result<usize, InsertError> {
        self.insert(self.row_count())
    }

    /// Insert a blank row at `row`
    ///
    /// Only `state` is written (as `Pending`); every other field takes the
    /// column default. Returns the position of the new row.
    pub fn insert(&mut self, row: usize) -> Result<usize, InsertError> {
        let mut record = Record::blank(self.store.columns());
        record.set_value(STATE_FIELD, RowState::Pending);

        match self.store.insert_row_with_defaults(row, &record) {
            Ok(position) => {
                self.selection.borrow_mut().row_inserted(position);
                self.listeners.emit(ModelEvent::RowsInserted(position));
                Ok(position)
            }
            Err(e) => {
                let err = InsertError::StoreRejected {
                    message: e.to_string(),
                    table: self.table_name.clone(),
                    database: self.store.database_name().to_string(),
                };
                self.record_error(err.to_string());
                Err(err)
            }
        }
    }

    /// Remove a row through the store
    ///
    /// Whether the row is soft- or hard-deleted is up to the store. The row
    /// is deselected.
    pub fn remove(&mut self, row: usize) -> bool {
        let before = self.store.row_count();

        if let Err(e) = self.store.remove_row(row) {
            tracing::warn!(target: TARGET, "remove row {} failed: {}", row, e);
            return false;
        }

        let left_view = self.store.row_count() < before;
        let was_selected = {
            let mut selection = self.selection.borrow_mut();
            let was_selected = selection.contains(row);
            if left_view {
                selection.row_removed(row);
            } else {
                selection.deselect(row);
            }
            was_selected
        };

        if left_view {
            self.listeners.emit(ModelEvent::RowsRemoved(row));
        } else {
            self.listeners.emit(ModelEvent::DataChanged { row, role: CHECKED_ROLE });
        }
        if was_selected {
            self.listeners.emit(ModelEvent::SelectedRowsChanged);
        }
        true
    }

    /// Remove every selected row, highest index first
    ///
    /// Returns the number removed. Rows that fail stay selected.
    pub fn remove_selected(&mut self) -> usize {
        let mut rows = self.selection.borrow().rows();
        let mut total = 0;

        while let Some(row) = rows.pop() {
            if self.remove(row) {
                total += 1;
            }
        }

        total
    }

    /// Clear `deleted_at` on a row
    pub fn try_recover_row(&mut self, row: usize) -> Result<(), RecoverError> {
        if row >= self.store.row_count() {
            return Err(RecoverError::InvalidRow(row));
        }

        let role = self
            .roles
            .role(DELETED_AT_FIELD)
            .ok_or_else(|| RecoverError::NoSuchColumn(DELETED_AT_FIELD.to_string()))?;

        if self.set(row, role, Value::Null) {
            Ok(())
        } else {
            Err(RecoverError::StoreRejected(self.store.last_error_text()))
        }
    }

    /// Clear `deleted_at` on a row, `false` on failure
    pub fn recover_row(&mut self, row: usize) -> bool {
        match self.try_recover_row(row) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(target: TARGET, "recover row {} failed: {}", row, e);
                false
            }
        }
    }

    /// Recover every selected row, highest index first
    ///
    /// Recovered rows are deselected. Returns the number recovered.
    pub fn recover_selected(&mut self) -> usize {
        let mut rows = self.selection.borrow().rows();
        let mut total = 0;

        while let Some(row) = rows.pop() {
            if self.recover_row(row) {
                self.selection.borrow_mut().deselect(row);
                self.listeners.emit(ModelEvent::SelectedRowsChanged);
                total += 1;
            }
        }

        total
    }

    /// Switch to another table
    ///
    /// Blank names and the current table are ignored. Before
    /// [`complete`](Self::complete) the name is only recorded.
    pub fn set_table(&mut self, name: &str) -> Result<(), BindError> {
        let table = name.trim();
        if table.is_empty() || table.eq_ignore_ascii_case(&self.table_name) {
            return Ok(());
        }

        if !self.completed {
            self.table_name = table.to_string();
            self.listeners.emit(ModelEvent::TableChanged);
            return Ok(());
        }

        self.bind(table)
    }

    /// Switch to another database
    ///
    /// The current name (case-insensitive) is ignored. Before
    /// [`complete`](Self::complete) the name is only recorded. Afterwards the
    /// database is reopened and the current table rebound if it exists there.
    pub fn set_database_name(&mut self, name: &str) -> bool {
        if name.eq_ignore_ascii_case(&self.database_name) {
            return true;
        }

        if self.completed {
            if let Err(e) = self.store.open_database(name) {
                self.record_error(format!("Can not open database '{}': {}", name, e));
                return false;
            }

            self.clear_selection();
            self.rebuild_roles();
            self.listeners.emit(ModelEvent::ModelReset);
        }

        self.database_name = name.to_string();
        self.listeners.emit(ModelEvent::DatabaseNameChanged);

        if self.completed && self.store.table_exists(&self.table_name) {
            let table = self.table_name.clone();
            // Failures are recorded by bind.
            let _ = self.bind(&table);
        }
        true
    }

    fn clear_selection(&mut self) {
        let changed = {
            let mut selection = self.selection.borrow_mut();
            let changed = !selection.is_empty();
            selection.clear();
            changed
        };
        if changed {
            self.listeners.emit(ModelEvent::SelectedRowsChanged);
        }
    }

    fn record_error(&mut self, msg: String) {
        tracing::warn!(target: TARGET, "{}", msg);
        self.error_string = msg.clone();
        self.listeners.emit(ModelEvent::Error(msg));
    }
}
