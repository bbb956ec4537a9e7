//! Analysis subsystem.
//!
//! Components:
//! - `queries`: the three fixed grouping queries and the SQL audit script.
//! - `report_runner`: the report stage, run against the relational store.
//! - `aggregates`: in-memory group-by aggregates used by charts and exports.
//! - `format`: number formatting shared by printed and written outputs.

pub mod aggregates;
pub mod format;
#[cfg(test)]
pub mod integration_tests;
pub mod queries;
pub mod report_runner;

pub use aggregates::{AgeBracket, CrossTab, GroupStats, LossRatio, YearMonth};
pub use queries::{standard_queries, AnalysisQuery};
