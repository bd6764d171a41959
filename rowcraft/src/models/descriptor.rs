//! Relational descriptions of entities and their fields
//!
//! Descriptors are built once per type by the [`ModelRegistry`] and shared
//! behind an `Arc`. They are never mutated after construction.
//!
//! [`ModelRegistry`]: super::registry::ModelRegistry

use super::tags::TagSettings;
use crate::database::types::{ColumnSize, ValueKind};
use indexmap::IndexMap;

/// Foreign-key target declared with `references:Entity.Field`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceInfo {
    pub entity: String,
    pub field: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

/// Relational shape of one entity member
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Member name as declared in Rust
    pub name: String,
    pub column: String,
    /// `None` for embedded members that are not flattened
    pub value_kind: Option<ValueKind>,
    pub type_name: String,
    /// Positional path from the entity root down to this member
    pub path: Vec<usize>,

    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    pub is_unique: bool,
    pub is_index: bool,
    pub is_not_null: bool,
    pub is_ignored: bool,
    pub is_read_only: bool,
    pub is_write_only: bool,
    pub is_embedded: bool,

    pub size: u32,
    pub precision: u32,
    pub scale: u32,
    pub default: Option<String>,
    pub reference: Option<ReferenceInfo>,

    pub raw_tag: String,
    pub settings: TagSettings,
}

impl FieldDescriptor {
    pub fn column_size(&self) -> ColumnSize {
        ColumnSize {
            size: self.size,
            precision: self.precision,
            scale: self.scale,
        }
    }

    /// Whether the field takes part in INSERT and UPDATE statements
    pub fn is_writable(&self) -> bool {
        !self.is_ignored && !self.is_read_only && !self.is_auto_increment
    }

    /// Whether the field can be read back into a value map
    pub fn is_readable(&self) -> bool {
        !self.is_ignored && !self.is_write_only && self.value_kind.is_some()
    }
}

/// Relational shape of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub name: String,
    pub table: String,
    /// Fields by member name, in flattened declaration order
    pub fields: IndexMap<String, FieldDescriptor>,
    pub fields_by_column: IndexMap<String, FieldDescriptor>,
    /// Member names of the primary key, in declaration order
    pub primary_key: Vec<String>,
    pub auto_increment: Option<String>,
    /// Index name to ordered column list
    pub indexes: IndexMap<String, Vec<String>>,
    pub unique_indexes: IndexMap<String, Vec<String>>,
    pub settings: TagSettings,
}

impl EntityDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields_by_column.get(column)
    }

    /// Column names in declaration order
    pub fn columns(&self) -> Vec<&str> {
        self.fields_by_column.keys().map(String::as_str).collect()
    }

    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.primary_key
            .iter()
            .filter_map(|name| self.fields.get(name))
            .map(|f| f.column.as_str())
            .collect()
    }

    pub fn auto_increment_field(&self) -> Option<&FieldDescriptor> {
        self.auto_increment
            .as_deref()
            .and_then(|name| self.fields.get(name))
    }

    /// Columns an INSERT should list
    pub fn writable_columns(&self) -> Vec<&str> {
        self.fields_by_column
            .values()
            .filter(|f| f.is_writable() && f.value_kind.is_some())
            .map(|f| f.column.as_str())
            .collect()
    }
}
