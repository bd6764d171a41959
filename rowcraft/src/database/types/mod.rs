//! Value and type system shared by the metadata engine and the SQL builder
//!
//! `SqlValue` carries bound arguments and member values, `ColumnType` moves
//! them in and out of Rust types, and the registry maps value kinds to DDL
//! column types per backend.

pub mod converter;
pub mod registry;
pub mod value;

pub use converter::{ColumnType, ConversionError, ValueKind};
pub use registry::{column_type, type_info, ColumnSize, DatabaseTypeInfo};
pub use value::{SqlValue, NO_ARGS};
