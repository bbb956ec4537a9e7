//! Chart rendering.
//!
//! Every chart is written as a PNG through the bitmap backend of `plotters`.
//!
//! Components:
//! - `age_brackets`: mean amount bars and share-of-total pie per age bracket.
//! - `monthly_trend`: dual-axis monthly count and mean amount lines.
//! - `heatmap`: cause by vehicle category mean amounts with a colour bar.
//! - `fonts`: CJK font discovery with an ASCII fallback.
//! - `palette`: colours and the heat map ramp.

pub mod age_brackets;
pub mod fonts;
pub mod heatmap;
pub mod monthly_trend;
pub mod palette;

pub use fonts::{resolve_font, FontChoice};

use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue, SegmentedCoord};
use plotters::coord::types::RangedCoordu32;

pub const AGE_BRACKET_CHART: &str = "1_年龄段_平均理赔金额与占比.png";
pub const MONTHLY_TREND_CHART: &str = "2_月度理赔次数与平均金额趋势.png";
pub const HEATMAP_CHART: &str = "3_出险原因与车型_平均理赔金额热力图.png";

/// Category axis with one slot per label.
///
/// A discrete `u32` range is inclusive, so `n` slots need `0..n - 1`. A single
/// category still gets two slots because plotters cannot centre a one-value
/// range.
pub(crate) fn category_axis(n: usize) -> SegmentedCoord<RangedCoordu32> {
    let last = u32::try_from(n).unwrap_or(u32::MAX).max(2) - 1;
    (0u32..last).into_segmented()
}

/// Category label for a segmented axis tick; only segment centres are labelled.
pub(crate) fn segment_label<S: AsRef<str>>(value: &SegmentValue<u32>, labels: &[S]) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|s| s.as_ref().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_label() {
        let labels = ["2024-01", "2024-02"];
        assert_eq!(segment_label(&SegmentValue::CenterOf(1), &labels), "2024-02");
        assert_eq!(segment_label(&SegmentValue::CenterOf(5), &labels), "");
        assert_eq!(segment_label(&SegmentValue::Exact(0), &labels), "");
        assert_eq!(segment_label(&SegmentValue::Last, &labels), "");
    }

    #[test]
    fn test_category_axis_has_one_slot_per_label() {
        use plotters::coord::ranged1d::Ranged;

        let axis = category_axis(4);
        let limit = (0, 400);
        let centres: Vec<i32> = (0..4)
            .map(|i| axis.map(&SegmentValue::CenterOf(i), limit))
            .collect();
        assert_eq!(centres, vec![50, 150, 250, 350]);
        assert_eq!(axis.map(&SegmentValue::Last, limit), 400);
        assert!(category_axis(1).map(&SegmentValue::CenterOf(0), limit) < 200);
    }
}
