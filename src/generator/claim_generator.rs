//! Seeded synthetic claim generation.
//!
//! The random source is owned by the generator and passed in explicitly, so
//! two generators built from the same seed and anchor yield identical records
//! regardless of anything else running in the process.

use chrono::{Duration, NaiveDateTime};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::dataset::types::{ClaimCause, ClaimRecord, Gender, Region, VehicleCategory};

/// Probability that a generated driver is drawn from the young age band.
pub const YOUNG_DRIVER_SHARE: f64 = 0.15;
/// Probability that a claim of a driver under 25 is re-rolled to a collision.
pub const YOUNG_COLLISION_SHARE: f64 = 0.6;
/// Drivers strictly below this age count as young for claim patterns.
pub const YOUNG_AGE_LIMIT: u8 = 25;

/// Mean and standard deviation of the base claim amount for a cause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountModel {
    pub mean: f64,
    pub std_dev: f64,
}

impl AmountModel {
    pub fn for_cause(cause: ClaimCause) -> Self {
        match cause {
            ClaimCause::Collision => AmountModel { mean: 5000.0, std_dev: 1500.0 },
            ClaimCause::Theft => AmountModel { mean: 80000.0, std_dev: 20000.0 },
            _ => AmountModel { mean: 2000.0, std_dev: 800.0 },
        }
    }
}

pub struct ClaimGenerator<R: Rng> {
    rng: R,
    anchor: NaiveDateTime,
}

impl ClaimGenerator<StdRng> {
    pub fn seeded(seed: u64, anchor: NaiveDateTime) -> Self {
        Self::new(StdRng::seed_from_u64(seed), anchor)
    }
}

impl<R: Rng> ClaimGenerator<R> {
    pub fn new(rng: R, anchor: NaiveDateTime) -> Self {
        Self { rng, anchor }
    }

    /// Generates `count` records with 1-based policy sequence numbers.
    pub fn generate(&mut self, count: usize) -> Vec<ClaimRecord> {
        let records: Vec<ClaimRecord> = (1..=count).map(|i| self.generate_one(i)).collect();
        debug!("Generated {} claim record(s) anchored at {}", records.len(), self.anchor);
        records
    }

    fn generate_one(&mut self, sequence: usize) -> ClaimRecord {
        let policy_id = format!("LB{}{:03}", self.anchor.format("%Y%m%d"), sequence);

        let gender = *self.pick(&Gender::ALL);
        let age = if self.rng.gen_bool(YOUNG_DRIVER_SHARE) {
            self.rng.gen_range(18..=25)
        } else {
            self.rng.gen_range(26..=60)
        };

        let vehicle_category = *self.pick(&VehicleCategory::ALL);
        let vehicle_model = self.pick(vehicle_category.models()).to_string();
        let vehicle_age = self.rng.gen_range(0..=10);
        let region = *self.pick(&Region::ALL);

        let mut claim_cause = *self.pick(&ClaimCause::ALL);
        let young = age < YOUNG_AGE_LIMIT;
        if young && self.rng.gen_bool(YOUNG_COLLISION_SHARE) {
            claim_cause = ClaimCause::Collision;
        }

        let model = AmountModel::for_cause(claim_cause);
        let z: f64 = self.rng.sample(StandardNormal);
        let mut amount = model.mean + model.std_dev * z;
        if young && claim_cause == ClaimCause::Collision {
            amount *= self.rng.gen_range(1.2..=1.5);
        }
        if vehicle_category == VehicleCategory::Luxury {
            amount *= self.rng.gen_range(1.3..=2.0);
        }
        let claim_amount = (amount.abs() * 100.0).round() / 100.0;

        let days_ago = self.rng.gen_range(1..=365);
        let claimed_at = self.anchor - Duration::days(days_ago);

        ClaimRecord {
            policy_id,
            gender,
            age,
            vehicle_category,
            vehicle_model,
            vehicle_age,
            region,
            claim_cause,
            claim_amount,
            claimed_at,
        }
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        // every vocabulary slice is a non-empty constant
        items.choose(&mut self.rng).unwrap_or(&items[0])
    }
}
