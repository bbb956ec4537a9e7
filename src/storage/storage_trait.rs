//! Storage Trait
//!
//! This module defines the `Storage` trait, the interface the loader and the
//! report runner use to reach the relational store.
//!
//! Implementors of this trait are responsible for:
//! - Replacing a table wholesale with new contents
//! - Executing read-only analytical queries
//! - Reporting table sizes
//!
//! All methods return a `Result` to handle potential storage errors.

use crate::error_handling::types::StorageError;
use crate::storage::types::{ResultTable, TableData};

pub trait Storage: Send + Sync {
    /// Drops any table with the same name and loads `table` in its place.
    ///
    /// Returns the number of rows inserted.
    fn replace_table(&self, table: &TableData) -> Result<usize, StorageError>;

    /// Runs a query and collects every returned row.
    fn query(&self, sql: &str) -> Result<ResultTable, StorageError>;

    /// Number of rows currently in `table`.
    fn row_count(&self, table: &str) -> Result<usize, StorageError>;
}
