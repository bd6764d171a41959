//! MySQL dialect
//!
//! Positional `?` placeholders, backtick identifiers, `LIMIT offset, count`
//! and no RETURNING clause; generated keys come from `LAST_INSERT_ID()`.

use super::{DatabaseBackend, SqlDialect};

/// Largest row count MySQL accepts, used when only an offset is given
const MAX_LIMIT: &str = "18446744073709551615";

#[derive(Debug, Clone, Copy, Default)]
pub struct MySQLDialect;

impl MySQLDialect {
    pub fn new() -> Self {
        Self
    }
}

impl SqlDialect for MySQLDialect {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::MySQL
    }

    fn driver_name(&self) -> &'static str {
        "mysql"
    }

    fn placeholder(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn format_bool(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn limit_offset(&self, limit: i64, offset: i64) -> String {
        match (limit >= 0, offset >= 0) {
            (true, true) => format!(" LIMIT {}, {}", offset, limit),
            (true, false) => format!(" LIMIT {}", limit),
            (false, true) => format!(" LIMIT {}, {}", offset, MAX_LIMIT),
            (false, false) => String::new(),
        }
    }

    fn insert_returning(&self, statement: &str, _pk_column: &str) -> String {
        statement.to_string()
    }

    fn supports_upsert(&self) -> bool {
        false
    }

    fn auto_increment_constraint(&self) -> Option<&'static str> {
        Some("AUTO_INCREMENT")
    }
}
