//! Dialect-aware SQL building
//!
//! [`SqlBuilder`] writes statements for PostgreSQL, MySQL and SQLite while
//! the matching [`SqlDialect`] handles placeholders, identifier quoting,
//! literals and LIMIT/OFFSET.

pub mod core;
pub mod dialects;
pub mod schema;

pub use self::core::{JoinType, SqlBuilder};
pub use dialects::{create_dialect, dialect_for_name, DatabaseBackend, SqlDialect};
pub use dialects::{MySQLDialect, PostgresDialect, SQLiteDialect};
pub use schema::create_index_statements;

pub use crate::database::types::SqlValue;
