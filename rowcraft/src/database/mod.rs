//! Database-facing types
//!
//! rowcraft does not open connections. This module only holds the value
//! and type vocabulary that generated statements bind and describe.

pub mod types;

pub use types::{ColumnType, ConversionError, SqlValue, ValueKind};
