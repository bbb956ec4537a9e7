//! Storage subsystem
//!
//! This module provides the relational store the claims are loaded into and
//! queried from.
//!
//! Components:
//! - `storage_trait`: the Storage trait defining a uniform API.
//! - `types`: table definitions, inferred column types and query results.
//! - `database_storage`: SQLite implementation using sqlx.
//! - `loader`: the relational loader stage.

pub mod database_storage;
pub mod loader;
pub mod storage_trait;
pub mod types;

pub use database_storage::DatabaseStorage;
pub use storage_trait::Storage;
pub use types::{CellValue, ColumnType, ResultTable, TableData};
