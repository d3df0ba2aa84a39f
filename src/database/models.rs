//! Data models for table rows and cell values

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// A single cell value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL, also returned for cells that cannot be resolved
    #[default]
    Null,
    /// Boolean, stored as integer 0/1
    Bool(bool),
    /// 64-bit integer
    Integer(i64),
    /// Floating point number
    Real(f64),
    /// UTF-8 text
    Text(String),
    /// Raw bytes
    Blob(Vec<u8>),
}

impl Value {
    /// Check if this is a NULL value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret the value as a checkbox state
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Real(r) => *r != 0.0,
            Value::Text(s) => !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false"),
            Value::Blob(b) => !b.is_empty(),
        }
    }

    /// Get the value as an integer, if it is one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    /// Get the value as text, if it is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Blob(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Bool(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*b as i64)),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

/// TEXT that is not valid UTF-8 is returned as [`Value::Blob`] so the bytes
/// survive being written back.
impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(text) => Value::Text(text.to_string()),
                Err(_) => Value::Blob(t.to_vec()),
            },
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        })
    }
}

/// Lifecycle state stored in the reserved `state` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowState {
    /// Created by an insert, not yet confirmed
    Pending = 0,
    /// Confirmed row
    Committed = 1,
}

impl RowState {
    /// Numeric value stored in the database
    pub fn as_i64(self) -> i64 {
        self as i64
    }

    /// Parse the stored numeric value
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(RowState::Pending),
            1 => Some(RowState::Committed),
            _ => None,
        }
    }
}

impl From<RowState> for Value {
    fn from(state: RowState) -> Self {
        Value::Integer(state.as_i64())
    }
}

/// One field of an insert template
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Column name
    pub name: String,
    /// Explicit value, used only when `generated` is set
    pub value: Value,
    /// True if the value is written, false to use the column default
    pub generated: bool,
}

/// Insert template: one field per column, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// Create a record whose fields all use their column defaults
    pub fn blank<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            fields: columns
                .iter()
                .map(|name| Field {
                    name: name.as_ref().to_string(),
                    value: Value::Null,
                    generated: false,
                })
                .collect(),
        }
    }

    /// Set an explicit value for a field and mark it generated
    ///
    /// Returns false if the record has no field with that name.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value.into();
                field.generated = true;
                true
            }
            None => false,
        }
    }

    /// Mark a field as generated or defaulted
    pub fn set_generated(&mut self, name: &str, generated: bool) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.generated = generated;
                true
            }
            None => false,
        }
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields that carry an explicit value
    pub fn generated_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.generated)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_to_bool() {
        assert!(!Value::Null.to_bool());
        assert!(Value::Bool(true).to_bool());
        assert!(Value::Integer(2).to_bool());
        assert!(!Value::Integer(0).to_bool());
        assert!(Value::from("yes").to_bool());
        assert!(!Value::from("false").to_bool());
        assert!(!Value::from("").to_bool());
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Integer(5));
    }

    #[test]
    fn test_value_json() {
        let json = serde_json::to_string(&Value::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
        let value: Value = serde_json::from_str("null").unwrap();
        assert!(value.is_null());
        let value: Value = serde_json::from_str("42").unwrap();
        assert_eq!(value, Value::Integer(42));
    }

    #[test]
    fn test_value_sqlite_roundtrip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let back: Value = conn
            .query_row("SELECT ?", [Value::Bool(true)], |row| row.get(0))
            .unwrap();
        assert_eq!(back, Value::Integer(1));
        let back: Value = conn
            .query_row("SELECT ?", [Value::Null], |row| row.get(0))
            .unwrap();
        assert!(back.is_null());
    }

    #[test]
    fn test_invalid_utf8_text_kept_as_bytes() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let back: Value = conn
            .query_row("SELECT CAST(x'41ff42' AS TEXT)", [], |row| row.get(0))
            .unwrap();
        assert_eq!(back, Value::Blob(vec![0x41, 0xff, 0x42]));

        let back: Value = conn
            .query_row("SELECT CAST(x'c3a9' AS TEXT)", [], |row| row.get(0))
            .unwrap();
        assert_eq!(back, Value::from("\u{e9}"));
    }

    #[test]
    fn test_row_state() {
        assert_eq!(RowState::Pending.as_i64(), 0);
        assert_eq!(RowState::from_i64(1), Some(RowState::Committed));
        assert_eq!(RowState::from_i64(7), None);
        assert_eq!(Value::from(RowState::Pending), Value::Integer(0));
    }

    #[test]
    fn test_blank_record() {
        let mut rec = Record::blank(&["id", "title", "state"]);
        assert_eq!(rec.len(), 3);
        assert_eq!(rec.generated_fields().count(), 0);

        assert!(rec.set_value("state", RowState::Pending));
        assert!(!rec.set_value("missing", 1));

        let generated: Vec<_> = rec.generated_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(generated, vec!["state"]);

        assert!(rec.set_generated("state", false));
        assert_eq!(rec.generated_fields().count(), 0);
    }
}
