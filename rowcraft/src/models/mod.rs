//! Entity metadata and SQL building
//!
//! A type opts in with `#[derive(Entity)]`, which describes its members to
//! the metadata engine. From there the registry derives table and column
//! names, keys, indexes and references, and moves values between records
//! and column maps.

use crate::database::types::SqlValue;
use crate::error::Result;
use indexmap::IndexMap;
use std::sync::Arc;

pub mod descriptor;
pub mod query_builder;
pub mod reflect;
pub mod registry;
pub mod tags;

pub use descriptor::{EntityDescriptor, FieldDescriptor, ReferenceInfo};
pub use reflect::{MemberShape, MemberType, NestedType, RecordShape, Reflect, TypeShape};
pub use registry::{ModelRegistry, RecordRef};
pub use tags::{has_tag_option, parse_tag_settings, TagSettings};

pub use query_builder::{
    create_dialect, create_index_statements, dialect_for_name, DatabaseBackend, JoinType,
    SqlBuilder, SqlDialect,
};

/// A persistable record
///
/// Implemented by `#[derive(Entity)]`. Every method goes through the global
/// [`ModelRegistry`], so metadata is extracted once per type.
pub trait Entity: Reflect + Sized {
    fn descriptor() -> Result<Arc<EntityDescriptor>> {
        ModelRegistry::global().extract::<Self>()
    }

    fn table_name() -> Result<String> {
        Ok(Self::descriptor()?.table.clone())
    }

    /// Column values of this record, optionally restricted to `only`
    fn field_values(&self, only: &[&str]) -> Result<IndexMap<String, SqlValue>> {
        ModelRegistry::global().field_values(self, only)
    }

    /// Write column values into this record
    fn apply_values<K, I>(&mut self, values: I) -> Result<()>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, SqlValue)>,
    {
        ModelRegistry::global().apply_values(self, values)
    }

    fn validate(&self) -> Result<()> {
        ModelRegistry::global().validate_not_null(self)
    }
}
