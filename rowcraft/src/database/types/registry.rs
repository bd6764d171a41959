//! Column type mappings per database backend
//!
//! Maps each [`ValueKind`] to the column type used in generated DDL for
//! PostgreSQL, MySQL and SQLite. Sized kinds (strings, decimals) take the
//! `size`, `precision` and `scale` annotation settings into account.

use super::converter::ValueKind;
use crate::models::query_builder::DatabaseBackend;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Column types for one value kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTypeInfo {
    pub postgres_type: &'static str,
    pub mysql_type: &'static str,
    pub sqlite_type: &'static str,
}

impl DatabaseTypeInfo {
    const fn new(
        postgres_type: &'static str,
        mysql_type: &'static str,
        sqlite_type: &'static str,
    ) -> Self {
        Self {
            postgres_type,
            mysql_type,
            sqlite_type,
        }
    }

    pub fn for_backend(&self, backend: DatabaseBackend) -> &'static str {
        match backend {
            DatabaseBackend::Postgres => self.postgres_type,
            DatabaseBackend::MySQL => self.mysql_type,
            DatabaseBackend::SQLite => self.sqlite_type,
        }
    }
}

/// Sizing settings read from a field's annotation; zero means unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnSize {
    pub size: u32,
    pub precision: u32,
    pub scale: u32,
}

static TYPE_MAPPINGS: Lazy<HashMap<ValueKind, DatabaseTypeInfo>> = Lazy::new(|| {
    use ValueKind::*;
    HashMap::from([
        (Bool, DatabaseTypeInfo::new("BOOLEAN", "BOOLEAN", "INTEGER")),
        // PostgreSQL has no TINYINT
        (I8, DatabaseTypeInfo::new("SMALLINT", "TINYINT", "INTEGER")),
        (I16, DatabaseTypeInfo::new("SMALLINT", "SMALLINT", "INTEGER")),
        (I32, DatabaseTypeInfo::new("INTEGER", "INT", "INTEGER")),
        (I64, DatabaseTypeInfo::new("BIGINT", "BIGINT", "INTEGER")),
        (U8, DatabaseTypeInfo::new("SMALLINT", "TINYINT UNSIGNED", "INTEGER")),
        (U16, DatabaseTypeInfo::new("INTEGER", "SMALLINT UNSIGNED", "INTEGER")),
        (U32, DatabaseTypeInfo::new("BIGINT", "INT UNSIGNED", "INTEGER")),
        (U64, DatabaseTypeInfo::new("NUMERIC(20,0)", "BIGINT UNSIGNED", "INTEGER")),
        (F32, DatabaseTypeInfo::new("REAL", "FLOAT", "REAL")),
        (F64, DatabaseTypeInfo::new("DOUBLE PRECISION", "DOUBLE", "REAL")),
        (Decimal, DatabaseTypeInfo::new("NUMERIC", "DECIMAL(65,30)", "NUMERIC")),
        (String, DatabaseTypeInfo::new("TEXT", "TEXT", "TEXT")),
        (Bytes, DatabaseTypeInfo::new("BYTEA", "BLOB", "BLOB")),
        (Uuid, DatabaseTypeInfo::new("UUID", "CHAR(36)", "TEXT")),
        (Json, DatabaseTypeInfo::new("JSONB", "JSON", "TEXT")),
        (Date, DatabaseTypeInfo::new("DATE", "DATE", "TEXT")),
        (Time, DatabaseTypeInfo::new("TIME", "TIME(6)", "TEXT")),
        (Timestamp, DatabaseTypeInfo::new("TIMESTAMP", "DATETIME(6)", "TEXT")),
        (TimestampTz, DatabaseTypeInfo::new("TIMESTAMPTZ", "TIMESTAMP(6)", "TEXT")),
    ])
});

/// Look up the unsized mapping for a kind, ignoring `Option` wrappers
pub fn type_info(kind: &ValueKind) -> Option<&'static DatabaseTypeInfo> {
    TYPE_MAPPINGS.get(kind.base())
}

/// Column type for a kind on the given backend, honoring sizing settings
pub fn column_type(kind: &ValueKind, backend: DatabaseBackend, size: ColumnSize) -> String {
    let base = kind.base();

    match base {
        ValueKind::String if size.size > 0 && backend != DatabaseBackend::SQLite => {
            return format!("VARCHAR({})", size.size);
        }
        ValueKind::Bytes if size.size > 0 && backend == DatabaseBackend::MySQL => {
            return format!("VARBINARY({})", size.size);
        }
        ValueKind::Decimal if size.precision > 0 => {
            return if size.scale > 0 {
                format!("DECIMAL({},{})", size.precision, size.scale)
            } else {
                format!("DECIMAL({})", size.precision)
            };
        }
        _ => {}
    }

    type_info(base)
        .map(|info| info.for_backend(backend))
        .unwrap_or("TEXT")
        .to_string()
}
