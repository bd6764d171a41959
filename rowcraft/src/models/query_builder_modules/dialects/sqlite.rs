//! SQLite dialect
//!
//! Positional `?` placeholders, double-quoted identifiers and integer
//! booleans. RETURNING requires SQLite 3.35 or newer.

use super::{DatabaseBackend, SqlDialect};
use crate::database::types::ValueKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct SQLiteDialect;

impl SQLiteDialect {
    pub fn new() -> Self {
        Self
    }
}

impl SqlDialect for SQLiteDialect {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::SQLite
    }

    fn driver_name(&self) -> &'static str {
        "sqlite3"
    }

    fn placeholder(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn format_bool(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn insert_returning(&self, statement: &str, pk_column: &str) -> String {
        format!("{} RETURNING {}", statement, self.quote_identifier(pk_column))
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    // OFFSET is only accepted after a LIMIT; -1 means no limit
    fn limit_offset(&self, limit: i64, offset: i64) -> String {
        match (limit >= 0, offset >= 0) {
            (true, true) => format!(" LIMIT {} OFFSET {}", limit, offset),
            (true, false) => format!(" LIMIT {}", limit),
            (false, true) => format!(" LIMIT -1 OFFSET {}", offset),
            (false, false) => String::new(),
        }
    }

    fn auto_increment_type(&self, _kind: &ValueKind) -> Option<&'static str> {
        Some("INTEGER PRIMARY KEY AUTOINCREMENT")
    }

    fn auto_increment_is_primary_key(&self) -> bool {
        true
    }
}
