//! SQL builder entry point
//!
//! The implementation is split across `query_builder_modules/`:
//!
//! - dialects/: per-database placeholders, quoting and literals
//! - core.rs: statement building and composition
//! - schema.rs: DDL, including tables generated from entity metadata

#[path = "query_builder_modules/mod.rs"]
mod query_builder_modules;

pub use query_builder_modules::*;
