//! SQL query operations for table access
//!
//! Low-level helpers used by the SQLite store. Table and column names come
//! from the catalog and are always quoted.

use rusqlite::{Connection, OptionalExtension, params_from_iter};
use chrono::{DateTime, Utc};
use crate::error::{StoreError, Result};
use super::models::{Record, Value};

/// Timestamp format used in database
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a DateTime for database storage
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp from database
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc))
}

/// Get current timestamp formatted for database
pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

/// Quote an identifier for use in SQL
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Names the hidden rowid answers to, tried in order
const ROWID_ALIASES: [&str; 3] = ["rowid", "oid", "_rowid_"];

/// How the rows of a table are addressed in writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    /// Declared primary key columns, in key order
    PrimaryKey(Vec<String>),
    /// Hidden rowid, under an alias no column shadows
    Rowid(&'static str),
}

/// Column layout of a table plus its row key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    /// Table name (catalog spelling)
    pub table: String,
    /// Column names in declaration order
    pub columns: Vec<String>,
    /// Row addressing
    pub key: RowKey,
}

impl TableLayout {
    fn key_expressions(&self) -> Vec<String> {
        match &self.key {
            RowKey::PrimaryKey(names) => names.iter().map(|n| quote_identifier(n)).collect(),
            RowKey::Rowid(alias) => vec![alias.to_string()],
        }
    }

    /// Key expressions followed by every column
    fn select_list(&self) -> String {
        self.key_expressions()
            .into_iter()
            .chain(self.columns.iter().map(|c| quote_identifier(c)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn key_condition(&self) -> String {
        self.key_expressions()
            .iter()
            .map(|e| format!("{} = ?", e))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn key_len(&self) -> usize {
        match &self.key {
            RowKey::PrimaryKey(names) => names.len(),
            RowKey::Rowid(_) => 1,
        }
    }

    fn read_row(&self, row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
        let key_len = self.key_len();
        let key = (0..key_len)
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let values = (key_len..key_len + self.columns.len())
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(RawRow { key, values })
    }
}

/// A row as read from a table
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// Values of the row key, used to address the row in writes
    pub key: Vec<Value>,
    /// Column values in layout order
    pub values: Vec<Value>,
}

// ============================================================================
// Catalog queries
// ============================================================================

/// List user tables in the database
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
         ORDER BY name"
    )?;

    let names = stmt.query_map([], |row| row.get(0))?;

    names.collect::<std::result::Result<Vec<String>, _>>().map_err(Into::into)
}

/// Read the columns of a table and pick its row key
///
/// The declared primary key wins. Tables without one fall back to the first
/// rowid alias that no column shadows.
pub fn table_layout(conn: &Connection, table: &str) -> Result<TableLayout> {
    let sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let mut stmt = conn.prepare(&sql)?;

    let info = stmt.query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i64>(5)?)))?;
    let info = info.collect::<std::result::Result<Vec<_>, _>>()?;

    if info.is_empty() {
        return Err(StoreError::TableNotFound(table.to_string()));
    }

    let mut primary: Vec<_> = info.iter().filter(|(_, pk)| *pk > 0).collect();
    primary.sort_by_key(|(_, pk)| *pk);
    let columns: Vec<String> = info.iter().map(|(name, _)| name.clone()).collect();

    let key = if primary.is_empty() {
        ROWID_ALIASES
            .into_iter()
            .find(|alias| !columns.iter().any(|c| c.eq_ignore_ascii_case(alias)))
            .map(RowKey::Rowid)
            .ok_or_else(|| StoreError::NoRowKey(table.to_string()))?
    } else {
        RowKey::PrimaryKey(primary.into_iter().map(|(name, _)| name.clone()).collect())
    };

    Ok(TableLayout {
        table: table.to_string(),
        columns,
        key,
    })
}

// ============================================================================
// Row queries
// ============================================================================

fn no_row(layout: &TableLayout, key: &[Value]) -> StoreError {
    StoreError::DatabaseError(format!("No row with key {:?} in '{}'", key, layout.table))
}

/// Read all rows of a table ordered by its row key
///
/// `condition` is an optional SQL expression appended as a WHERE clause.
pub fn select_rows(conn: &Connection, layout: &TableLayout, condition: Option<&str>) -> Result<Vec<RawRow>> {
    let mut sql = format!("SELECT {} FROM {}", layout.select_list(), quote_identifier(&layout.table));
    if let Some(condition) = condition {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }
    sql.push_str(" ORDER BY ");
    sql.push_str(&layout.key_expressions().join(", "));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| layout.read_row(row))?;

    rows.collect::<std::result::Result<Vec<_>, _>>().map_err(Into::into)
}

/// Read a single row by key
pub fn select_row(conn: &Connection, layout: &TableLayout, key: &[Value]) -> Result<RawRow> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {}",
        layout.select_list(),
        quote_identifier(&layout.table),
        layout.key_condition()
    );
    conn.query_row(&sql, params_from_iter(key), |row| layout.read_row(row))
        .optional()?
        .ok_or_else(|| no_row(layout, key))
}

/// Insert a row writing only the generated fields of `record`
///
/// Returns the row as stored, column defaults included.
pub fn insert_record(conn: &Connection, layout: &TableLayout, record: &Record) -> Result<RawRow> {
    let fields: Vec<_> = record.generated_fields().collect();
    let table = quote_identifier(&layout.table);

    if fields.is_empty() {
        let sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, layout.select_list());
        return Ok(conn.query_row(&sql, [], |row| layout.read_row(row))?);
    }

    let names = fields.iter().map(|f| quote_identifier(&f.name)).collect::<Vec<_>>().join(", ");
    let placeholders = vec!["?"; fields.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        names,
        placeholders,
        layout.select_list()
    );
    let row = conn.query_row(&sql, params_from_iter(fields.iter().map(|f| &f.value)), |row| {
        layout.read_row(row)
    })?;
    Ok(row)
}

/// Write a single cell
///
/// Returns the row as stored after the column's type affinity was applied.
pub fn update_cell(
    conn: &Connection,
    layout: &TableLayout,
    key: &[Value],
    column: &str,
    value: &Value,
) -> Result<RawRow> {
    let sql = format!(
        "UPDATE {} SET {} = ? WHERE {} RETURNING {}",
        quote_identifier(&layout.table),
        quote_identifier(column),
        layout.key_condition(),
        layout.select_list()
    );
    let params = std::iter::once(value).chain(key.iter());

    conn.query_row(&sql, params_from_iter(params), |row| layout.read_row(row))
        .optional()?
        .ok_or_else(|| no_row(layout, key))
}

/// Soft delete a row by stamping its deletion column
pub fn soft_delete_row(
    conn: &Connection,
    layout: &TableLayout,
    key: &[Value],
    column: &str,
    timestamp: &str,
) -> Result<RawRow> {
    update_cell(conn, layout, key, column, &Value::Text(timestamp.to_string()))
}

/// Physically delete a row
pub fn delete_row(conn: &Connection, layout: &TableLayout, key: &[Value]) -> Result<()> {
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        quote_identifier(&layout.table),
        layout.key_condition()
    );
    let rows = conn.execute(&sql, params_from_iter(key))?;
    if rows == 0 {
        return Err(no_row(layout, key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::RowState;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(r#"
            CREATE TABLE notes (
                id INTEGER PRIMARY KEY,
                body TEXT NOT NULL DEFAULT 'empty',
                weight REAL NOT NULL DEFAULT 0,
                state INTEGER NOT NULL DEFAULT 1,
                deleted_at TEXT
            );
            INSERT INTO notes (body) VALUES ('first'), ('second');
        "#).unwrap();
        conn
    }

    fn layout(conn: &Connection) -> TableLayout {
        table_layout(conn, "notes").unwrap()
    }

    fn key(id: i64) -> Vec<Value> {
        vec![Value::Integer(id)]
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = parse_timestamp("2024-03-01 12:30:00").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-01 12:30:00");
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp(&now_timestamp()).is_some());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("books"), "\"books\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_list_tables() {
        let conn = setup();
        conn.execute_batch("CREATE TABLE authors (id INTEGER PRIMARY KEY); CREATE VIEW v AS SELECT 1").unwrap();
        assert_eq!(list_tables(&conn).unwrap(), vec!["authors", "notes"]);
    }

    #[test]
    fn test_table_layout() {
        let conn = setup();
        let notes = layout(&conn);
        assert_eq!(notes.columns, vec!["id", "body", "weight", "state", "deleted_at"]);
        assert_eq!(notes.key, RowKey::PrimaryKey(vec!["id".to_string()]));
        assert!(matches!(
            table_layout(&conn, "missing"),
            Err(StoreError::TableNotFound(_))
        ));
    }

    #[test]
    fn test_table_layout_row_keys() {
        let conn = setup();
        conn.execute_batch(r#"
            CREATE TABLE plain (name TEXT);
            CREATE TABLE shadowed (rowid TEXT, name TEXT);
            CREATE TABLE hidden (rowid TEXT, oid TEXT, _ROWID_ TEXT);
            CREATE TABLE pairs (b TEXT, a TEXT, PRIMARY KEY (a, b)) WITHOUT ROWID;
        "#).unwrap();

        assert_eq!(table_layout(&conn, "plain").unwrap().key, RowKey::Rowid("rowid"));
        assert_eq!(table_layout(&conn, "shadowed").unwrap().key, RowKey::Rowid("oid"));
        assert!(matches!(
            table_layout(&conn, "hidden"),
            Err(StoreError::NoRowKey(t)) if t == "hidden"
        ));
        assert_eq!(
            table_layout(&conn, "pairs").unwrap().key,
            RowKey::PrimaryKey(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_select_rows_with_condition() {
        let conn = setup();
        let notes = layout(&conn);
        conn.execute("UPDATE notes SET deleted_at = '2024-01-01 00:00:00' WHERE body = 'first'", []).unwrap();

        let all = select_rows(&conn, &notes, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].key, key(1));

        let live = select_rows(&conn, &notes, Some("\"deleted_at\" IS NULL")).unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].values[1], Value::from("second"));
    }

    #[test]
    fn test_rows_of_shadowed_rowid_table() {
        let conn = setup();
        conn.execute_batch(r#"
            CREATE TABLE shadowed (rowid TEXT, name TEXT);
            INSERT INTO shadowed VALUES ('r1', 'one'), ('r2', 'two');
        "#).unwrap();
        let shadowed = table_layout(&conn, "shadowed").unwrap();

        let rows = select_rows(&conn, &shadowed, None).unwrap();
        assert_eq!(rows[1].values, vec![Value::from("r2"), Value::from("two")]);

        let row = update_cell(&conn, &shadowed, &rows[1].key, "name", &Value::from("TWO")).unwrap();
        assert_eq!(row.values[1], Value::from("TWO"));
        assert_eq!(select_row(&conn, &shadowed, &rows[0].key).unwrap().values[1], Value::from("one"));
    }

    #[test]
    fn test_insert_record_defaults() {
        let conn = setup();
        let notes = layout(&conn);

        let mut rec = Record::blank(&notes.columns);
        rec.set_value("state", RowState::Pending);
        let row = insert_record(&conn, &notes, &rec).unwrap();
        assert_eq!(row.key, key(3));
        assert_eq!(row.values[1], Value::from("empty"));
        assert_eq!(row.values[3], Value::Integer(0));
        assert!(row.values[4].is_null());
        assert_eq!(select_row(&conn, &notes, &row.key).unwrap(), row);

        let row = insert_record(&conn, &notes, &Record::blank(&notes.columns)).unwrap();
        assert_eq!(row.values[3], Value::Integer(1));
    }

    #[test]
    fn test_update_returns_stored_value() {
        let conn = setup();
        let notes = layout(&conn);

        let row = update_cell(&conn, &notes, &key(1), "weight", &Value::from("12")).unwrap();
        assert_eq!(row.values[2], Value::Real(12.0));
    }

    #[test]
    fn test_update_and_delete() {
        let conn = setup();
        let notes = layout(&conn);

        let row = update_cell(&conn, &notes, &key(1), "body", &Value::from("edited")).unwrap();
        assert_eq!(row.values[1], Value::from("edited"));

        let row = soft_delete_row(&conn, &notes, &key(2), "deleted_at", "2024-01-01 00:00:00").unwrap();
        assert_eq!(row.values[4], Value::from("2024-01-01 00:00:00"));

        delete_row(&conn, &notes, &key(1)).unwrap();
        assert!(delete_row(&conn, &notes, &key(1)).is_err());
        assert!(update_cell(&conn, &notes, &key(1), "body", &Value::Null).is_err());
        assert!(select_row(&conn, &notes, &key(1)).is_err());
    }
}
