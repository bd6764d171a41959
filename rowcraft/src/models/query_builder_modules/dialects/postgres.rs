//! PostgreSQL dialect
//!
//! Numbered `$n` placeholders, double-quoted identifiers, native booleans
//! and RETURNING on every data-modifying statement.

use super::{DatabaseBackend, SqlDialect};
use crate::database::types::ValueKind;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\d+)").expect("Invalid placeholder regex"));

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    pub fn new() -> Self {
        Self
    }
}

impl SqlDialect for PostgresDialect {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
    }

    fn driver_name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, position: usize) -> String {
        format!("${}", position)
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn format_bool(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn insert_returning(&self, statement: &str, pk_column: &str) -> String {
        format!("{} RETURNING {}", statement, self.quote_identifier(pk_column))
    }

    fn supports_upsert(&self) -> bool {
        true
    }

    fn renumber_placeholders(&self, sql: &str, offset: usize) -> String {
        if offset == 0 {
            return sql.to_string();
        }
        PLACEHOLDER
            .replace_all(sql, |caps: &Captures| match caps[1].parse::<usize>() {
                Ok(n) => format!("${}", n + offset),
                Err(_) => caps[0].to_string(),
            })
            .into_owned()
    }

    fn auto_increment_type(&self, kind: &ValueKind) -> Option<&'static str> {
        match kind.base() {
            ValueKind::I8 | ValueKind::I16 | ValueKind::I32 | ValueKind::U8 | ValueKind::U16 => {
                Some("SERIAL")
            }
            _ => Some("BIGSERIAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_and_limits() {
        let d = PostgresDialect::new();
        assert_eq!(d.placeholder(3), "$3");
        assert_eq!(d.limit_offset(10, 20), " LIMIT 10 OFFSET 20");
        assert_eq!(d.limit_offset(-1, 5), " OFFSET 5");
        assert_eq!(d.limit_offset(-1, -1), "");
    }

    #[test]
    fn test_renumber() {
        let d = PostgresDialect::new();
        assert_eq!(
            d.renumber_placeholders("a = $1 AND b = $2", 3),
            "a = $4 AND b = $5"
        );
        assert_eq!(d.renumber_placeholders("a = $1", 0), "a = $1");
    }

    #[test]
    fn test_returning() {
        let d = PostgresDialect::new();
        assert_eq!(
            d.insert_returning("INSERT INTO \"t\" (\"a\") VALUES ($1)", "id"),
            "INSERT INTO \"t\" (\"a\") VALUES ($1) RETURNING \"id\""
        );
        assert_eq!(d.format_bool(false), "FALSE");
        assert_eq!(d.driver_name(), "postgres");
    }

    #[test]
    fn test_serial_width_follows_kind() {
        let d = PostgresDialect::new();
        assert_eq!(d.auto_increment_type(&ValueKind::I32), Some("SERIAL"));
        assert_eq!(d.auto_increment_type(&ValueKind::I64), Some("BIGSERIAL"));
        assert_eq!(d.auto_increment_constraint(), None);
        assert!(!d.auto_increment_is_primary_key());
    }
}
