//! Synthetic data generator stage.
//!
//! Produces the configured number of claim records from the configured seed
//! and writes them to the flat file. Downstream stages re-read that file.

pub mod claim_generator;

pub use claim_generator::ClaimGenerator;

use log::info;

use crate::configuration::Config;
use crate::dataset::{write_records, ClaimRecord};
use crate::error_handling::types::PipelineError;

/// Number of records echoed to stdout after generation.
const PREVIEW_ROWS: usize = 5;

pub fn run(config: &Config) -> Result<Vec<ClaimRecord>, PipelineError> {
    let anchor = config.generation_anchor()?;
    info!(
        "Generating {} claim record(s) with seed {} anchored at {}",
        config.generator.record_count, config.generator.seed, anchor
    );

    let records =
        ClaimGenerator::seeded(config.generator.seed, anchor).generate(config.generator.record_count);
    write_records(&config.paths.claims_csv, &records)?;

    info!(
        "Synthetic data generated: {} record(s) saved to {}",
        records.len(),
        config.paths.claims_csv.display()
    );
    println!("Preview:");
    for record in records.iter().take(PREVIEW_ROWS) {
        println!(
            "  {} {} {} {} {} {} {} {} {:.2} {}",
            record.policy_id,
            record.gender,
            record.age,
            record.vehicle_category,
            record.vehicle_model,
            record.vehicle_age,
            record.region,
            record.claim_cause,
            record.claim_amount,
            record.claimed_at.format(crate::configuration::config::TIMESTAMP_FORMAT)
        );
    }
    Ok(records)
}
