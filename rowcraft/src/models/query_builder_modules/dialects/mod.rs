//! Database dialect implementations for the SQL builder
//!
//! Each dialect knows how one database spells placeholders, identifiers,
//! literals and LIMIT/OFFSET. The builder holds a `Box<dyn SqlDialect>` and
//! never branches on the backend itself.

use crate::database::types::ValueKind;
use crate::error::{Error, Result};
use chrono::{NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Database backends with a built-in dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseBackend {
    Postgres,
    MySQL,
    SQLite,
}

impl DatabaseBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseBackend::Postgres => "postgres",
            DatabaseBackend::MySQL => "mysql",
            DatabaseBackend::SQLite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseBackend {
    type Err = Error;

    /// Case-insensitive; accepts the usual driver aliases
    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseBackend::Postgres),
            "mysql" | "mariadb" => Ok(DatabaseBackend::MySQL),
            "sqlite" | "sqlite3" => Ok(DatabaseBackend::SQLite),
            _ => Err(Error::unsupported_dialect(name)),
        }
    }
}

/// Trait for database-specific SQL generation
pub trait SqlDialect: Send + Sync {
    fn backend(&self) -> DatabaseBackend;

    /// Name of the driver this dialect targets, e.g. `sqlite3`
    fn driver_name(&self) -> &'static str;

    /// Bound-parameter token for the 1-based `position`
    fn placeholder(&self, position: usize) -> String;

    fn quote_char(&self) -> char;

    /// Quote an identifier, quoting each part of a dotted name separately
    fn quote_identifier(&self, identifier: &str) -> String {
        let quote = self.quote_char();
        let doubled: String = [quote, quote].iter().collect();
        identifier
            .split('.')
            .map(|part| {
                format!(
                    "{q}{}{q}",
                    part.replace(quote, &doubled),
                    q = quote
                )
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Escape `\`, `%` and `_` for use inside a LIKE pattern
    fn escape_like(&self, value: &str) -> String {
        value
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    }

    fn format_bool(&self, value: bool) -> &'static str;

    /// Quoted timestamp literal with trailing fractional zeros trimmed
    fn format_time(&self, value: &NaiveDateTime) -> String {
        let micros = (value.nanosecond() / 1_000) % 1_000_000;
        let base = value.format("%Y-%m-%d %H:%M:%S");
        if micros == 0 {
            format!("'{}'", base)
        } else {
            let fraction = format!("{:06}", micros);
            format!("'{}.{}'", base, fraction.trim_end_matches('0'))
        }
    }

    /// LIMIT/OFFSET clause with a leading space; a negative value is omitted
    fn limit_offset(&self, limit: i64, offset: i64) -> String {
        let mut sql = String::new();
        if limit >= 0 {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if offset >= 0 {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }

    /// The insert statement extended to return the generated key, if supported
    fn insert_returning(&self, statement: &str, pk_column: &str) -> String;

    /// Whether RETURNING may be appended to UPDATE and DELETE statements
    fn supports_upsert(&self) -> bool;

    /// Shift numbered placeholders by `offset` so `sql` can be spliced after
    /// `offset` already-bound arguments
    fn renumber_placeholders(&self, sql: &str, _offset: usize) -> String {
        sql.to_string()
    }

    /// Column type that replaces the mapped type of an auto-increment column
    fn auto_increment_type(&self, _kind: &ValueKind) -> Option<&'static str> {
        None
    }

    /// Constraint appended to an auto-increment column
    fn auto_increment_constraint(&self) -> Option<&'static str> {
        None
    }

    /// Whether [`auto_increment_type`](Self::auto_increment_type) already
    /// declares the primary key, leaving no table-level PRIMARY KEY
    fn auto_increment_is_primary_key(&self) -> bool {
        false
    }
}

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::MySQLDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SQLiteDialect;

/// Factory function to create the appropriate dialect for a database backend
pub fn create_dialect(backend: DatabaseBackend) -> Box<dyn SqlDialect> {
    match backend {
        DatabaseBackend::Postgres => Box::new(PostgresDialect::new()),
        DatabaseBackend::MySQL => Box::new(MySQLDialect::new()),
        DatabaseBackend::SQLite => Box::new(SQLiteDialect::new()),
    }
}

/// Dialect for a backend name such as `postgresql` or `SQLite3`
pub fn dialect_for_name(name: &str) -> Result<Box<dyn SqlDialect>> {
    name.parse::<DatabaseBackend>().map(create_dialect)
}
