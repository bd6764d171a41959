//! Rowcraft - entity metadata and dialect-aware SQL building
//!
//! Rowcraft provides the two halves an ORM sits on:
//! - Metadata extraction: `#[derive(Entity)]` structs become cached
//!   descriptions of tables, columns, keys, indexes and references
//! - Statement building: `SqlBuilder` writes parameterized SQL for
//!   PostgreSQL, MySQL and SQLite
//!
//! ```ignore
//! use rowcraft::prelude::*;
//!
//! #[derive(Entity, Default)]
//! #[rowcraft("table:users")]
//! pub struct User {
//!     #[rowcraft("primaryKey;autoIncrement")]
//!     pub id: i64,
//!     #[rowcraft("notNull;size:255")]
//!     pub email: String,
//! }
//!
//! let mut sql = SqlBuilder::postgres();
//! sql.select(&[]).from(&User::table_name()?).where_("id = ?", [7]);
//! let (text, args) = sql.to_sql();
//! ```

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

// Lets generated `::rowcraft::` paths resolve inside this crate too
extern crate self as rowcraft;

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod utils;

// Re-export main types for public API
pub use config::Config;
pub use database::types::{ColumnType, ConversionError, SqlValue, ValueKind, NO_ARGS};
pub use error::{Error, Result};
pub use models::query_builder::{DatabaseBackend, JoinType, SqlBuilder, SqlDialect};
pub use models::{
    Entity, EntityDescriptor, FieldDescriptor, MemberShape, MemberType, ModelRegistry,
    NestedType, RecordRef, RecordShape, ReferenceInfo, Reflect, TagSettings, TypeShape,
};
pub use utils::{to_camel_case, to_pascal_case, to_snake_case};

// Free functions over the global registry
pub use models::registry::{apply_values, clear_cache, extract, field_values, validate_not_null};
pub use models::tags::{has_tag_option, parse_tag_settings};

// Derive macro shares its name with the trait it implements
pub use rowcraft_macros::Entity;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, ErrorContext, Result};
    pub use crate::models::query_builder::{DatabaseBackend, JoinType, SqlBuilder};
    pub use crate::models::{ModelRegistry, Reflect};
    // Trait and derive macro
    pub use crate::Entity;
    pub use crate::{Config, SqlValue, NO_ARGS};
}
