//! Core statement builder
//!
//! `SqlBuilder` accumulates SQL text and bound arguments side by side.
//! It is not an AST: every call appends text immediately, so a call made
//! out of order (for example `set` before `update`) yields malformed SQL
//! rather than an error. Every value passed through `where_`, `values`,
//! `set` and friends is bound as an argument behind a dialect placeholder
//! and never interpolated into the text.
//!
//! Statement-starting calls (`select`, `insert`, `update`, `delete`,
//! `create_table`, ...) reset the text, arguments, placeholder counter and
//! section bookmarks, keeping only the dialect.

use super::dialects::{create_dialect, dialect_for_name, DatabaseBackend, SqlDialect};
use crate::database::types::SqlValue;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        }
    }
}

/// Dialect-aware SQL statement builder
pub struct SqlBuilder {
    dialect: Box<dyn SqlDialect>,
    buffer: String,
    args: Vec<SqlValue>,
    arg_position: usize,
    sections: HashMap<String, usize>,
    // A LIMIT has been written, so OFFSET can follow in its plain form
    limited: bool,
    log_sql: bool,
}

impl SqlBuilder {
    pub fn new(dialect: Box<dyn SqlDialect>) -> Self {
        Self {
            dialect,
            buffer: String::with_capacity(128),
            args: Vec::new(),
            arg_position: 0,
            sections: HashMap::new(),
            limited: false,
            log_sql: false,
        }
    }

    pub fn for_backend(backend: DatabaseBackend) -> Self {
        Self::new(create_dialect(backend))
    }

    pub fn postgres() -> Self {
        Self::for_backend(DatabaseBackend::Postgres)
    }

    pub fn mysql() -> Self {
        Self::for_backend(DatabaseBackend::MySQL)
    }

    pub fn sqlite() -> Self {
        Self::for_backend(DatabaseBackend::SQLite)
    }

    /// Builder for a case-insensitive dialect name such as `postgresql`
    pub fn for_dialect(name: &str) -> Result<Self> {
        dialect_for_name(name).map(Self::new)
    }

    /// Log every finished statement at debug level instead of trace
    pub fn with_sql_logging(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.dialect.backend()
    }

    /// Clear text, arguments and bookmarks; the dialect is kept
    pub fn reset(&mut self) -> &mut Self {
        self.buffer.clear();
        self.args.clear();
        self.arg_position = 0;
        self.sections.clear();
        self.limited = false;
        self
    }

    pub fn sql(&self) -> &str {
        &self.buffer
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Finished statement text and its arguments
    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        if self.log_sql {
            log::debug!("SQL: {} ({} args)", self.buffer, self.args.len());
        } else {
            log::trace!("SQL: {} ({} args)", self.buffer, self.args.len());
        }
        (self.buffer.clone(), self.args.clone())
    }

    /// Consume the builder, returning text and arguments without copying
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.buffer, self.args)
    }

    // Low-level appends

    pub fn append(&mut self, sql: &str) -> &mut Self {
        self.buffer.push_str(sql);
        self
    }

    pub fn append_quoted(&mut self, identifier: &str) -> &mut Self {
        let quoted = self.dialect.quote_identifier(identifier);
        self.buffer.push_str(&quoted);
        self
    }

    /// Emit the next placeholder without binding an argument
    pub fn append_placeholder(&mut self) -> &mut Self {
        self.arg_position += 1;
        let token = self.dialect.placeholder(self.arg_position);
        self.buffer.push_str(&token);
        self
    }

    /// Bind an argument without emitting a placeholder
    pub fn arg(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.args.push(value.into());
        self
    }

    /// Append text that already contains dialect placeholders
    pub fn append_with_args<V, I>(&mut self, sql: &str, args: I) -> &mut Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        self.buffer.push_str(sql);
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append text, replacing each `?` with the dialect's next placeholder
    pub fn append_with_placeholders<V, I>(&mut self, sql: &str, args: I) -> &mut Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        let mut parts = sql.split('?').peekable();
        while let Some(part) = parts.next() {
            self.buffer.push_str(part);
            if parts.peek().is_some() {
                self.append_placeholder();
            }
        }
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn append_column_list(&mut self, columns: &[&str]) -> &mut Self {
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.append_quoted(col);
        }
        self
    }

    fn contains_keyword(&self, keyword: &str) -> bool {
        self.buffer.to_uppercase().contains(keyword)
    }

    // Sections

    /// Bookmark the current end of the text under `name`
    pub fn mark_section(&mut self, name: &str) -> &mut Self {
        self.sections.insert(name.to_string(), self.buffer.len());
        self
    }

    /// Insert `content` at the offset bookmarked as `name`
    ///
    /// Bookmarks after that offset move with the text they point at. An
    /// unknown name fails with [`Error::SectionNotFound`] and leaves the
    /// text untouched.
    pub fn replace_section(&mut self, name: &str, content: &str) -> Result<&mut Self> {
        let pos = match self.sections.get(name) {
            Some(&pos) if self.buffer.is_char_boundary(pos) => pos,
            _ => return Err(Error::section_not_found(name)),
        };

        self.buffer.insert_str(pos, content);
        for offset in self.sections.values_mut() {
            if *offset > pos {
                *offset += content.len();
            }
        }
        Ok(self)
    }

    // Queries

    /// Start a SELECT; no columns selects `*`
    ///
    /// A column containing a space or `(` is written as-is, which allows
    /// aliases and expressions such as `COUNT(*) AS total`.
    pub fn select(&mut self, columns: &[&str]) -> &mut Self {
        self.reset().append("SELECT ");

        if columns.is_empty() {
            return self.append("*");
        }
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            if col.contains(' ') || col.contains('(') {
                self.append(col);
            } else {
                self.append_quoted(col);
            }
        }
        self
    }

    pub fn from(&mut self, table: &str) -> &mut Self {
        self.append(" FROM ").append_quoted(table)
    }

    pub fn join(&mut self, join_type: JoinType, table: &str, condition: &str) -> &mut Self {
        self.append(" ")
            .append(join_type.as_str())
            .append(" JOIN ")
            .append_quoted(table)
            .append(" ON ")
            .append(condition)
    }

    /// Add a condition, using `WHERE` the first time and `AND` afterwards
    ///
    /// `?` marks become dialect placeholders bound to `args` in order.
    pub fn where_<V, I>(&mut self, condition: &str, args: I) -> &mut Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        let keyword = if self.contains_keyword(" WHERE ") {
            " AND "
        } else {
            " WHERE "
        };
        self.append(keyword).append_with_placeholders(condition, args)
    }

    /// Order by columns; a trailing ` ASC`/` DESC` (either case) is kept
    pub fn order_by(&mut self, columns: &[&str]) -> &mut Self {
        if columns.is_empty() {
            return self;
        }

        self.append(" ORDER BY ");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            let direction = if col.ends_with(" DESC") || col.ends_with(" desc") {
                Some(" DESC")
            } else if col.ends_with(" ASC") || col.ends_with(" asc") {
                Some(" ASC")
            } else {
                None
            };
            match direction {
                Some(direction) => {
                    let name = col.split_whitespace().next().unwrap_or_default();
                    self.append_quoted(name).append(direction);
                }
                None => {
                    self.append_quoted(col);
                }
            }
        }
        self
    }

    pub fn group_by(&mut self, columns: &[&str]) -> &mut Self {
        if columns.is_empty() {
            return self;
        }

        self.append(" GROUP BY ");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            if col.contains('(') {
                self.append(col);
            } else {
                self.append_quoted(col);
            }
        }
        self
    }

    pub fn having<V, I>(&mut self, condition: &str, args: I) -> &mut Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        self.append(" HAVING ").append_with_placeholders(condition, args)
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limited |= limit >= 0;
        let clause = self.dialect.limit_offset(limit, -1);
        self.append(&clause)
    }

    /// OFFSET alone, or ` OFFSET m` after an earlier [`limit`](Self::limit)
    pub fn offset(&mut self, offset: i64) -> &mut Self {
        if self.limited && offset >= 0 {
            return self.append(&format!(" OFFSET {}", offset));
        }
        let clause = self.dialect.limit_offset(-1, offset);
        self.append(&clause)
    }

    /// Both clauses in the dialect's form; a negative value is omitted
    pub fn limit_offset(&mut self, limit: i64, offset: i64) -> &mut Self {
        self.limited |= limit >= 0;
        let clause = self.dialect.limit_offset(limit, offset);
        self.append(&clause)
    }

    /// Start `SELECT COUNT(...)`; an empty column or `*` counts rows
    pub fn count(&mut self, column: &str) -> &mut Self {
        self.reset();
        if column.is_empty() || column == "*" {
            return self.append("SELECT COUNT(*)");
        }
        self.append("SELECT COUNT(")
            .append_quoted(column)
            .append(")")
    }

    // Inserts

    pub fn insert(&mut self, table: &str) -> &mut Self {
        self.reset().append("INSERT INTO ").append_quoted(table)
    }

    pub fn columns(&mut self, columns: &[&str]) -> &mut Self {
        self.append(" (").append_column_list(columns).append(")")
    }

    /// One row of bound values
    pub fn values<V, I>(&mut self, values: I) -> &mut Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        self.append(" VALUES ").append_row(values)
    }

    /// Several rows of bound values, placeholders numbered row by row
    pub fn multiple_values<V, R, I>(&mut self, rows: I) -> &mut Self
    where
        V: Into<SqlValue>,
        R: IntoIterator<Item = V>,
        I: IntoIterator<Item = R>,
    {
        self.append(" VALUES ");
        for (i, row) in rows.into_iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.append_row(row);
        }
        self
    }

    fn append_row<V, I>(&mut self, values: I) -> &mut Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        self.append("(");
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.append_placeholder().arg(value);
        }
        self.append(")")
    }

    // Updates

    pub fn update(&mut self, table: &str) -> &mut Self {
        self.reset().append("UPDATE ").append_quoted(table)
    }

    /// `SET column = ?` the first time, `, column = ?` afterwards
    pub fn set(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        let separator = if self.contains_keyword(" SET ") {
            ", "
        } else {
            " SET "
        };
        self.append(separator)
            .append_quoted(column)
            .append(" = ")
            .append_placeholder()
            .arg(value)
    }

    /// Several assignments in iteration order
    pub fn set_map<K, V, I>(&mut self, values: I) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<SqlValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (column, value) in values {
            self.set(column.as_ref(), value);
        }
        self
    }

    // Deletes

    /// Bare `DELETE`; follow with `from`
    pub fn delete(&mut self) -> &mut Self {
        self.reset().append("DELETE")
    }

    pub fn delete_from(&mut self, table: &str) -> &mut Self {
        self.reset().append("DELETE FROM ").append_quoted(table)
    }

    /// Return `column` from the statement if the dialect can
    ///
    /// Inserts go through the dialect's insert form; other statements get
    /// `RETURNING` only when [`SqlDialect::supports_upsert`] holds.
    pub fn returning(&mut self, column: &str) -> &mut Self {
        if self.buffer.starts_with("INSERT") {
            self.buffer = self.dialect.insert_returning(&self.buffer, column);
            return self;
        }
        if self.dialect.supports_upsert() {
            self.append(" RETURNING ").append_quoted(column);
        }
        self
    }

    // Composition

    /// Splice another builder's statement and arguments into this one
    fn splice(&mut self, other: &SqlBuilder) -> &mut Self {
        let text = self
            .dialect
            .renumber_placeholders(&other.buffer, self.arg_position);
        self.buffer.push_str(&text);
        self.arg_position += other.arg_position;
        self.args.extend(other.args.iter().cloned());
        self
    }

    /// `(subquery)` with an optional alias
    pub fn subquery(&mut self, other: &SqlBuilder, alias: Option<&str>) -> &mut Self {
        self.append("(").splice(other).append(")");
        if let Some(alias) = alias.filter(|a| !a.is_empty()) {
            self.append(" AS ").append_quoted(alias);
        }
        self
    }

    pub fn exists(&mut self, other: &SqlBuilder) -> &mut Self {
        self.append("EXISTS (").splice(other).append(")")
    }

    pub fn not_exists(&mut self, other: &SqlBuilder) -> &mut Self {
        self.append("NOT EXISTS (").splice(other).append(")")
    }

    pub fn union(&mut self, other: &SqlBuilder) -> &mut Self {
        self.append(" UNION ").splice(other)
    }

    pub fn union_all(&mut self, other: &SqlBuilder) -> &mut Self {
        self.append(" UNION ALL ").splice(other)
    }

    // Raw text

    pub fn raw(&mut self, sql: &str) -> &mut Self {
        self.append(sql)
    }

    /// Raw text whose placeholders are already written in dialect form
    pub fn raw_with_args<V, I>(&mut self, sql: &str, args: I) -> &mut Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        let before = self.args.len();
        self.append_with_args(sql, args);
        self.arg_position += self.args.len() - before;
        self
    }

    /// Bind arguments for placeholders written by hand
    pub fn with_args<V, I>(&mut self, args: I) -> &mut Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        let before = self.args.len();
        self.args.extend(args.into_iter().map(Into::into));
        self.arg_position += self.args.len() - before;
        self
    }

    // Transactions

    pub fn begin_transaction(&mut self) -> &mut Self {
        self.reset().append("BEGIN")
    }

    pub fn commit_transaction(&mut self) -> &mut Self {
        self.reset().append("COMMIT")
    }

    pub fn rollback_transaction(&mut self) -> &mut Self {
        self.reset().append("ROLLBACK")
    }

    // Helpers

    pub fn escape_like(&self, value: &str) -> String {
        self.dialect.escape_like(value)
    }

    pub fn quoted_table_column(&self, table: &str, column: &str) -> String {
        format!(
            "{}.{}",
            self.dialect.quote_identifier(table),
            self.dialect.quote_identifier(column)
        )
    }
}

impl fmt::Display for SqlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}

impl fmt::Debug for SqlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlBuilder")
            .field("backend", &self.dialect.backend())
            .field("sql", &self.buffer)
            .field("args", &self.args)
            .finish()
    }
}
