//! Claim records and the flat file that connects the pipeline stages.

pub mod flat_file;
pub mod types;

pub use flat_file::{read_raw, read_records, write_records, RawTable};
pub use types::{ClaimCause, ClaimRecord, Gender, Region, VehicleCategory};
