//! Schema statements
//!
//! DDL lives on [`SqlBuilder`] beside the query methods, so a table
//! definition follows the same append-as-you-go rules:
//!
//! ```text
//! create_table("users", true)
//!     .add_column("id", "BIGINT", &["NOT NULL"])
//!     .add_column("name", "TEXT", &[])
//!     .primary_key(&["id"])
//!     .close_parenthesis()
//! ```
//!
//! [`SqlBuilder::create_table_for`] writes the whole statement from an
//! entity's metadata.

use super::core::SqlBuilder;
use super::dialects::DatabaseBackend;
use crate::database::types::column_type;
use crate::error::Result;
use crate::models::descriptor::EntityDescriptor;
use crate::models::reflect::Reflect;
use crate::models::registry::ModelRegistry;
use crate::utils::string::to_snake_case;

impl SqlBuilder {
    pub fn create_table(&mut self, table: &str, if_not_exists: bool) -> &mut Self {
        self.reset().append("CREATE TABLE ");
        if if_not_exists {
            self.append("IF NOT EXISTS ");
        }
        self.append_quoted(table)
    }

    /// Column definition; the first one opens the column list
    pub fn add_column(&mut self, column: &str, sql_type: &str, constraints: &[&str]) -> &mut Self {
        let opener = if self.sql().contains('(') { ", " } else { " (" };
        self.append(opener)
            .append_quoted(column)
            .append(" ")
            .append(sql_type);
        for constraint in constraints {
            self.append(" ").append(constraint);
        }
        self
    }

    pub fn primary_key(&mut self, columns: &[&str]) -> &mut Self {
        self.append(", PRIMARY KEY (");
        self.append_identifiers(columns);
        self.append(")")
    }

    pub fn unique_key(&mut self, name: &str, columns: &[&str]) -> &mut Self {
        self.append(", CONSTRAINT ")
            .append_quoted(name)
            .append(" UNIQUE (");
        self.append_identifiers(columns);
        self.append(")")
    }

    pub fn foreign_key(
        &mut self,
        name: &str,
        column: &str,
        ref_table: &str,
        ref_column: &str,
        on_delete: Option<&str>,
        on_update: Option<&str>,
    ) -> &mut Self {
        self.append(", CONSTRAINT ")
            .append_quoted(name)
            .append(" FOREIGN KEY (")
            .append_quoted(column)
            .append(") REFERENCES ")
            .append_quoted(ref_table)
            .append("(")
            .append_quoted(ref_column)
            .append(")");
        if let Some(action) = on_delete.filter(|a| !a.is_empty()) {
            self.append(" ON DELETE ").append(action);
        }
        if let Some(action) = on_update.filter(|a| !a.is_empty()) {
            self.append(" ON UPDATE ").append(action);
        }
        self
    }

    pub fn close_parenthesis(&mut self) -> &mut Self {
        self.append(")")
    }

    pub fn alter_table(&mut self, table: &str) -> &mut Self {
        self.reset().append("ALTER TABLE ").append_quoted(table)
    }

    pub fn add_column_to_table(
        &mut self,
        column: &str,
        sql_type: &str,
        constraints: &[&str],
    ) -> &mut Self {
        self.append(" ADD COLUMN ")
            .append_quoted(column)
            .append(" ")
            .append(sql_type);
        for constraint in constraints {
            self.append(" ").append(constraint);
        }
        self
    }

    pub fn rename_table(&mut self, new_name: &str) -> &mut Self {
        self.append(" RENAME TO ").append_quoted(new_name)
    }

    pub fn drop_column(&mut self, column: &str) -> &mut Self {
        self.append(" DROP COLUMN ").append_quoted(column)
    }

    pub fn create_index(&mut self, name: &str, table: &str, unique: bool) -> &mut Self {
        self.reset().append("CREATE ");
        if unique {
            self.append("UNIQUE ");
        }
        self.append("INDEX ")
            .append_quoted(name)
            .append(" ON ")
            .append_quoted(table)
    }

    /// Indexed columns; each may carry a trailing `ASC` or `DESC`
    pub fn index_columns(&mut self, columns: &[&str]) -> &mut Self {
        self.append(" (");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            let mut words = col.split_whitespace();
            let name = words.next().unwrap_or_default();
            self.append_quoted(name);
            if let Some(direction) = words.next() {
                self.append(" ").append(&direction.to_uppercase());
            }
        }
        self.append(")")
    }

    pub fn drop_table(&mut self, table: &str, if_exists: bool) -> &mut Self {
        self.reset().append("DROP TABLE ");
        if if_exists {
            self.append("IF EXISTS ");
        }
        self.append_quoted(table)
    }

    pub fn drop_index(&mut self, name: &str, if_exists: bool) -> &mut Self {
        self.reset().append("DROP INDEX ");
        if if_exists {
            self.append("IF EXISTS ");
        }
        self.append_quoted(name)
    }

    fn append_identifiers(&mut self, columns: &[&str]) {
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.append_quoted(col);
        }
    }

    /// Full CREATE TABLE statement for an entity type, described by the
    /// global registry
    pub fn create_table_for<T: Reflect>(&mut self, if_not_exists: bool) -> Result<&mut Self> {
        self.create_table_with::<T>(ModelRegistry::global(), if_not_exists)
    }

    /// Same as [`create_table_for`](Self::create_table_for) with metadata
    /// from `registry`
    pub fn create_table_with<T: Reflect>(
        &mut self,
        registry: &ModelRegistry,
        if_not_exists: bool,
    ) -> Result<&mut Self> {
        let entity = registry.extract::<T>()?;
        Ok(self.create_table_for_entity(&entity, if_not_exists))
    }

    /// Full CREATE TABLE statement for already extracted metadata
    ///
    /// Unique groups become table constraints; plain indexes are left to
    /// [`create_index_statements`].
    pub fn create_table_for_entity(
        &mut self,
        entity: &EntityDescriptor,
        if_not_exists: bool,
    ) -> &mut Self {
        let backend = self.backend();
        let mut inline_primary_key = false;

        self.create_table(&entity.table, if_not_exists);

        for field in entity.fields.values() {
            let Some(kind) = field.value_kind.as_ref() else {
                continue;
            };
            if field.is_ignored {
                continue;
            }

            let dialect = self.dialect();
            let (serial, extra, inline) = if field.is_auto_increment {
                (
                    dialect.auto_increment_type(kind),
                    dialect.auto_increment_constraint(),
                    dialect.auto_increment_is_primary_key(),
                )
            } else {
                (None, None, false)
            };
            let sql_type = match serial {
                Some(serial) => serial.to_string(),
                None => column_type(kind, backend, field.column_size()),
            };
            inline_primary_key |= inline;

            let mut constraints: Vec<String> = Vec::new();
            if (field.is_not_null || field.is_primary_key) && !inline {
                constraints.push("NOT NULL".to_string());
            }
            if let Some(extra) = extra {
                constraints.push(extra.to_string());
            }
            if let Some(default) = field.default.as_deref() {
                constraints.push(format!("DEFAULT {}", default));
            }
            let constraints: Vec<&str> = constraints.iter().map(String::as_str).collect();
            self.add_column(&field.column, &sql_type, &constraints);
        }

        let primary_key = entity.primary_key_columns();
        if !primary_key.is_empty() && !inline_primary_key {
            self.primary_key(&primary_key);
        }

        for (name, columns) in &entity.unique_indexes {
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            self.unique_key(name, &columns);
        }

        for field in entity.fields.values() {
            let Some(reference) = field.reference.as_ref() else {
                continue;
            };
            let name = format!("fk_{}_{}", entity.table, field.column);
            self.foreign_key(
                &name,
                &field.column,
                &to_snake_case(&reference.entity),
                &to_snake_case(&reference.field),
                reference.on_delete.as_deref(),
                reference.on_update.as_deref(),
            );
        }

        self.close_parenthesis()
    }
}

/// CREATE INDEX statements for an entity's non-unique index groups
pub fn create_index_statements(backend: DatabaseBackend, entity: &EntityDescriptor) -> Vec<String> {
    entity
        .indexes
        .iter()
        .map(|(name, columns)| {
            let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
            let mut builder = SqlBuilder::for_backend(backend);
            builder
                .create_index(name, &entity.table, false)
                .index_columns(&columns);
            builder.into_parts().0
        })
        .collect()
}
