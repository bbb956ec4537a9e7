pub mod analysis;
pub mod charts;
pub mod configuration;
pub mod dashboard;
pub mod dataset;
pub mod error_handling;
pub mod generator;
pub mod storage;
