use std::path::Path;

use plotters::coord::ranged1d::SegmentValue;
use plotters::coord::Shift;
use plotters::prelude::*;

use super::fonts::FontChoice;
use super::palette::{COUNT_LINE, MEAN_LINE};
use super::{category_axis, segment_label};
use crate::analysis::aggregates::MonthlyStats;
use crate::analysis::format::thousands;
use crate::error_handling::types::ChartError;

const SIZE: (u32, u32) = (1200, 600);

/// Claim count on the left axis, mean amount on the right, one point per month.
pub fn render(path: &Path, months: &[MonthlyStats], font: &FontChoice) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    draw(&root, months, font)?;
    root.present()?;
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    months: &[MonthlyStats],
    font: &FontChoice,
) -> Result<(), ChartError> {
    if months.is_empty() {
        return Err(ChartError::RenderError(
            "no monthly data to plot".to_string(),
        ));
    }
    let labels: Vec<String> = months.iter().map(|m| m.month.to_string()).collect();
    let max_count = months
        .iter()
        .map(|m| m.stats.count as f64)
        .fold(0.0, f64::max)
        .max(1.0);
    let max_mean = months
        .iter()
        .map(|m| m.stats.mean)
        .fold(0.0, f64::max)
        .max(1.0);

    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(
            font.pick("月度理赔次数与平均金额趋势", "Monthly claim count and mean amount"),
            font.bold(24.0),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .right_y_label_area_size(100)
        .build_cartesian_2d(category_axis(labels.len()), 0f64..max_count * 1.2)?
        .set_secondary_coord(category_axis(labels.len()), 0f64..max_mean * 1.2);

    chart
        .configure_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(v, &labels))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .x_desc(font.pick("出险年月", "Month"))
        .y_desc(font.pick("理赔次数", "Claims"))
        .x_label_style(font.desc(13.0))
        .y_label_style(font.desc(14.0).color(&COUNT_LINE))
        .axis_desc_style(font.desc(16.0))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_label_formatter(&|v| thousands(*v, 0))
        .y_desc(font.pick("平均理赔金额 (元)", "Mean claim (CNY)"))
        .label_style(font.desc(14.0).color(&MEAN_LINE))
        .axis_desc_style(font.desc(16.0))
        .draw()?;

    let counts: Vec<(SegmentValue<u32>, f64)> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (SegmentValue::CenterOf(i as u32), m.stats.count as f64))
        .collect();
    let means: Vec<(SegmentValue<u32>, f64)> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (SegmentValue::CenterOf(i as u32), m.stats.mean))
        .collect();

    chart
        .draw_series(LineSeries::new(counts.clone(), COUNT_LINE.stroke_width(2)))?
        .label(font.pick("理赔次数", "Claims"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COUNT_LINE.stroke_width(2)));
    chart.draw_series(
        counts
            .into_iter()
            .map(|p| Circle::new(p, 4, COUNT_LINE.filled())),
    )?;

    chart
        .draw_secondary_series(LineSeries::new(means.clone(), MEAN_LINE.stroke_width(2)))?
        .label(font.pick("平均金额", "Mean amount"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MEAN_LINE.stroke_width(2)));
    chart.draw_secondary_series(
        means
            .into_iter()
            .map(|p| TriangleMarker::new(p, 5, MEAN_LINE.filled())),
    )?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font(font.desc(14.0))
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregates::{GroupStats, YearMonth};

    fn month(m: u32, count: usize, mean: f64) -> MonthlyStats {
        MonthlyStats {
            month: YearMonth { year: 2024, month: m },
            stats: GroupStats {
                count,
                total: mean * count as f64,
                mean,
            },
        }
    }

    /// Leftmost and rightmost column holding a pixel of `color`.
    fn column_extent(buf: &[u8], width: u32, color: RGBColor) -> Option<(u32, u32)> {
        buf.chunks_exact(3)
            .enumerate()
            .filter(|(_, px)| *px == [color.0, color.1, color.2])
            .map(|(i, _)| i as u32 % width)
            .fold(None, |acc, x| match acc {
                None => Some((x, x)),
                Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
            })
    }

    #[test]
    fn test_last_month_reaches_right_of_plot() {
        let months = [month(1, 10, 5000.0), month(2, 2, 9000.0)];
        let mut buf = vec![255u8; (SIZE.0 * SIZE.1 * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, SIZE).into_drawing_area();
            draw(&root, &months, &FontChoice::fallback()).unwrap();
            root.present().unwrap();
        }
        let (_, right) = column_extent(&buf, SIZE.0, COUNT_LINE).unwrap();
        assert!(right > SIZE.0 * 65 / 100, "count line ends at x={}", right);
    }

    #[test]
    fn test_no_months_is_an_error() {
        let mut buf = vec![255u8; (SIZE.0 * SIZE.1 * 3) as usize];
        let root = BitMapBackend::with_buffer(&mut buf, SIZE).into_drawing_area();
        let result = draw(&root, &[], &FontChoice::fallback());
        assert!(matches!(result, Err(ChartError::RenderError(_))));
    }
}
