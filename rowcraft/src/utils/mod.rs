//! Shared helpers used by the metadata engine and the schema builder

pub mod string;

pub use string::{to_camel_case, to_pascal_case, to_snake_case};
