//! Built-in sample schema for in-memory databases

/// SQL to create the sample books table
pub const CREATE_BOOKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL DEFAULT '',
    author          TEXT NOT NULL DEFAULT '',
    price           REAL NOT NULL DEFAULT 0,
    state           INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT DEFAULT CURRENT_TIMESTAMP,
    deleted_at      TEXT
)
"#;

/// Sample rows for the books table
pub const INSERT_SAMPLE_BOOKS: &str = r#"
INSERT INTO books (title, author, price) VALUES
    ('The C Programming Language', 'Brian W. Kernighan', 45.0),
    ('Structure and Interpretation of Computer Programs', 'Harold Abelson', 55.5),
    ('The Art of Computer Programming', 'Donald E. Knuth', 199.0),
    ('Compilers: Principles, Techniques, and Tools', 'Alfred V. Aho', 89.9),
    ('Design Patterns', 'Erich Gamma', 42.0)
"#;

/// All table creation statements in order
pub const CREATE_ALL_TABLES: &[&str] = &[
    CREATE_BOOKS_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_sample_schema() {
        let conn = Connection::open_in_memory().unwrap();
        for sql in CREATE_ALL_TABLES {
            conn.execute(sql, []).unwrap();
        }
        conn.execute(INSERT_SAMPLE_BOOKS, []).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM books WHERE deleted_at IS NULL AND state = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 5);
    }
}
