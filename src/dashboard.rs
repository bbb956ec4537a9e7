//! Dashboard outputs derived straight from the flat file.
//!
//! Components:
//! - `builder`: the chart stage, writing three PNG charts and a text summary.
//! - `summary`: the plain-text summary of headline figures and tables.
//! - `workbook`: the separately runnable multi-sheet spreadsheet export.
//!
//! Premiums and loss ratio are simulated here from their own seed and are
//! not comparable with figures computed from a different seed.

pub mod builder;
pub mod summary;
pub mod workbook;

pub use builder::DashboardReport;
