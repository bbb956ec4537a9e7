//! Group-by aggregates computed in memory from the flat file.
//!
//! These feed the charts, the text summary and the workbook. Derived values
//! (premium, loss ratio, bracket, month bucket) are recomputed here on every
//! run and never written back to the claim records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::format::round2;
use crate::dataset::types::{ClaimCause, ClaimRecord, VehicleCategory};

/// Bounds of the simulated premium as a multiple of the claim amount.
pub const PREMIUM_FACTOR_MIN: f64 = 1.5;
pub const PREMIUM_FACTOR_MAX: f64 = 3.0;

pub const DIMENSION_VEHICLE_CATEGORY: &str = "车型类别";
pub const DIMENSION_CLAIM_CAUSE: &str = "出险原因";

/// Count, total and mean of claim amounts for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupStats {
    pub count: usize,
    pub total: f64,
    pub mean: f64,
}

impl GroupStats {
    pub fn from_amounts<I: IntoIterator<Item = f64>>(amounts: I) -> Self {
        let (count, total) = amounts
            .into_iter()
            .fold((0usize, 0.0f64), |(n, sum), a| (n + 1, sum + a));
        let mean = if count == 0 { 0.0 } else { total / count as f64 };
        Self { count, total, mean }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBracket {
    Young,
    YoungAdult,
    MiddleAged,
    Senior,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::Young,
        AgeBracket::YoungAdult,
        AgeBracket::MiddleAged,
        AgeBracket::Senior,
    ];

    pub fn from_age(age: u8) -> Self {
        AgeBracket::ALL
            .into_iter()
            .find(|bracket| {
                let (lo, hi) = bracket.bounds();
                (lo..=hi).contains(&age)
            })
            .unwrap_or(AgeBracket::Senior)
    }

    /// Inclusive age range covered by the bracket.
    pub fn bounds(&self) -> (u8, u8) {
        match self {
            AgeBracket::Young => (0, 25),
            AgeBracket::YoungAdult => (26, 40),
            AgeBracket::MiddleAged => (41, 60),
            AgeBracket::Senior => (61, u8::MAX),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::Young => "青年 (≤25)",
            AgeBracket::YoungAdult => "中青年 (26-40)",
            AgeBracket::MiddleAged => "中年 (41-60)",
            AgeBracket::Senior => "老年 (>60)",
        }
    }

    pub fn ascii_label(&self) -> &'static str {
        match self {
            AgeBracket::Young => "<=25",
            AgeBracket::YoungAdult => "26-40",
            AgeBracket::MiddleAged => "41-60",
            AgeBracket::Senior => ">60",
        }
    }
}

/// Every bracket in order, empty brackets included with zero stats.
pub fn age_bracket_summary(records: &[ClaimRecord]) -> Vec<(AgeBracket, GroupStats)> {
    AgeBracket::ALL
        .iter()
        .map(|bracket| {
            let stats = GroupStats::from_amounts(
                records
                    .iter()
                    .filter(|r| AgeBracket::from_age(r.age) == *bracket)
                    .map(|r| r.claim_amount),
            );
            (*bracket, stats)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    /// Label used by the workbook, e.g. `2024年03月`.
    pub fn chinese_label(&self) -> String {
        format!("{}年{:02}月", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyStats {
    pub month: YearMonth,
    pub stats: GroupStats,
}

/// Months present in the data, in chronological order.
pub fn monthly_summary(records: &[ClaimRecord]) -> Vec<MonthlyStats> {
    let mut buckets: BTreeMap<YearMonth, Vec<f64>> = BTreeMap::new();
    for record in records {
        buckets
            .entry(YearMonth::of(&record.claimed_at))
            .or_default()
            .push(record.claim_amount);
    }
    buckets
        .into_iter()
        .map(|(month, amounts)| MonthlyStats {
            month,
            stats: GroupStats::from_amounts(amounts),
        })
        .collect()
}

/// Mean claim amount per claim cause (rows) and vehicle category (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub causes: Vec<ClaimCause>,
    pub categories: Vec<VehicleCategory>,
    pub means: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn max(&self) -> f64 {
        self.means
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.means
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }
}

/// Only causes and categories present in the data appear; empty cells are 0.
pub fn cause_by_category_means(records: &[ClaimRecord]) -> CrossTab {
    let causes: Vec<ClaimCause> = ClaimCause::ALL
        .into_iter()
        .filter(|c| records.iter().any(|r| r.claim_cause == *c))
        .collect();
    let categories: Vec<VehicleCategory> = VehicleCategory::ALL
        .into_iter()
        .filter(|c| records.iter().any(|r| r.vehicle_category == *c))
        .collect();
    let means = causes
        .iter()
        .map(|cause| {
            categories
                .iter()
                .map(|category| {
                    let stats = GroupStats::from_amounts(
                        records
                            .iter()
                            .filter(|r| r.claim_cause == *cause && r.vehicle_category == *category)
                            .map(|r| r.claim_amount),
                    );
                    round2(stats.mean)
                })
                .collect()
        })
        .collect();
    CrossTab {
        causes,
        categories,
        means,
    }
}

/// One row of the per-dimension summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionRow {
    pub dimension: &'static str,
    pub value: String,
    pub count: usize,
    pub total: f64,
}

/// Vehicle-category rows followed by claim-cause rows.
pub fn dimension_summary(records: &[ClaimRecord]) -> Vec<DimensionRow> {
    let by_category = VehicleCategory::ALL.into_iter().filter_map(|category| {
        dimension_row(
            DIMENSION_VEHICLE_CATEGORY,
            category.label(),
            records.iter().filter(|r| r.vehicle_category == category),
        )
    });
    let by_cause = ClaimCause::ALL.into_iter().filter_map(|cause| {
        dimension_row(
            DIMENSION_CLAIM_CAUSE,
            cause.label(),
            records.iter().filter(|r| r.claim_cause == cause),
        )
    });
    by_category.chain(by_cause).collect()
}

fn dimension_row<'a, I>(dimension: &'static str, value: &str, group: I) -> Option<DimensionRow>
where
    I: Iterator<Item = &'a ClaimRecord>,
{
    let stats = GroupStats::from_amounts(group.map(|r| r.claim_amount));
    (stats.count > 0).then(|| DimensionRow {
        dimension,
        value: value.to_string(),
        count: stats.count,
        total: round2(stats.total),
    })
}

/// Premium per record: claim amount times a seeded uniform factor in [1.5, 3.0).
pub fn simulate_premiums(records: &[ClaimRecord], seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    records
        .iter()
        .map(|r| r.claim_amount * rng.gen_range(PREMIUM_FACTOR_MIN..PREMIUM_FACTOR_MAX))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossRatio {
    pub total_claim: f64,
    pub total_premium: f64,
    pub ratio: f64,
}

pub fn loss_ratio(records: &[ClaimRecord], premiums: &[f64]) -> LossRatio {
    let total_claim: f64 = records.iter().map(|r| r.claim_amount).sum();
    let total_premium: f64 = premiums.iter().sum();
    let ratio = if total_premium > 0.0 {
        total_claim / total_premium
    } else {
        0.0
    };
    LossRatio {
        total_claim,
        total_premium,
        ratio,
    }
}
