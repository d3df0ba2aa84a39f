//! Database connection management

use std::path::Path;
use rusqlite::Connection;
use crate::error::{StoreError, Result};
use crate::MEMORY_DATABASE;
use super::schema;

/// Database connection wrapper
pub struct Database {
    /// Database name (file path or `:memory:`)
    name: String,
    /// SQLite connection
    conn: Option<Connection>,
}

impl Database {
    /// Open a database by name
    ///
    /// `:memory:` opens an empty in-memory database, anything else is a file path.
    pub fn open(name: &str) -> Result<Self> {
        let conn = if name == MEMORY_DATABASE {
            Connection::open_in_memory()?
        } else {
            Connection::open(Path::new(name))?
        };

        Ok(Self {
            name: name.to_string(),
            conn: Some(conn),
        })
    }

    /// Create an in-memory database holding the sample tables
    pub fn create_sample() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        for sql in schema::CREATE_ALL_TABLES {
            conn.execute(sql, [])?;
        }
        conn.execute(schema::INSERT_SAMPLE_BOOKS, [])?;

        Ok(Self {
            name: MEMORY_DATABASE.to_string(),
            conn: Some(conn),
        })
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| {
            StoreError::DatabaseError("Database not open".to_string())
        })
    }

    /// Get the database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the database connection
    pub fn close(&mut self) {
        self.conn = None;
    }

    /// Check if database is open
    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_memory() {
        let db = Database::open(MEMORY_DATABASE).unwrap();
        assert!(db.is_open());
        assert_eq!(db.name(), ":memory:");
    }

    #[test]
    fn test_open_file() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let name = db_path.to_string_lossy().to_string();

        let db = Database::open(&name).unwrap();
        db.connection().unwrap()
            .execute_batch("CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)")
            .unwrap();
        assert!(db_path.exists());
        assert_eq!(db.name(), name);
    }

    #[test]
    fn test_create_sample() {
        let db = Database::create_sample().unwrap();
        let count: i64 = db.connection().unwrap()
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_closed_connection() {
        let mut db = Database::open(MEMORY_DATABASE).unwrap();
        db.close();
        assert!(!db.is_open());
        assert!(db.connection().is_err());
    }
}
