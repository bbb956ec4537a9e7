use std::path::Path;

use plotters::coord::ranged1d::SegmentValue;
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::fonts::FontChoice;
use super::palette;
use super::{category_axis, segment_label};
use crate::analysis::aggregates::{AgeBracket, GroupStats};
use crate::analysis::format::thousands;
use crate::error_handling::types::ChartError;

const SIZE: (u32, u32) = (1400, 640);

/// Mean amount per bracket as bars, share of total amount as a pie.
pub fn render(
    path: &Path,
    stats: &[(AgeBracket, GroupStats)],
    font: &FontChoice,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    draw(&root, stats, font)?;
    root.present()?;
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    stats: &[(AgeBracket, GroupStats)],
    font: &FontChoice,
) -> Result<(), ChartError> {
    root.fill(&WHITE)?;
    let root = root.titled(
        font.pick("车险理赔 - 年龄段分析", "Claims by age bracket"),
        font.bold(28.0),
    )?;
    let (w, _) = root.dim_in_pixel();
    let (left, right) = root.split_horizontally((w / 2) as i32);
    draw_bars(&left, stats, font)?;
    draw_pie(&right, stats, font)
}

fn bracket_labels<'a>(stats: &[(AgeBracket, GroupStats)], font: &'a FontChoice) -> Vec<&'a str> {
    stats
        .iter()
        .map(|(bracket, _)| font.pick(bracket.label(), bracket.ascii_label()))
        .collect()
}

fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    stats: &[(AgeBracket, GroupStats)],
    font: &FontChoice,
) -> Result<(), ChartError> {
    let labels = bracket_labels(stats, font);
    let means: Vec<f64> = stats.iter().map(|(_, s)| s.mean).collect();
    let y_max = means.iter().copied().fold(0.0, f64::max).max(1.0) * 1.15;

    let mut chart = ChartBuilder::on(area)
        .caption(
            font.pick("各年龄段平均理赔金额对比", "Mean claim amount by age bracket"),
            font.bold(20.0),
        )
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(category_axis(labels.len()), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(v, &labels))
        .y_label_formatter(&|v| thousands(*v, 0))
        .x_desc(font.pick("年龄段", "Age bracket"))
        .y_desc(font.pick("平均理赔金额 (元)", "Mean claim (CNY)"))
        .label_style(font.desc(14.0))
        .axis_desc_style(font.desc(16.0))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(palette::BAR_FILL.filled())
            .margin(25)
            .data(means.iter().enumerate().map(|(i, m)| (i as u32, *m))),
    )?;
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(palette::BAR_EDGE.stroke_width(1))
            .margin(25)
            .data(means.iter().enumerate().map(|(i, m)| (i as u32, *m))),
    )?;

    let value_style = TextStyle::from(font.desc(13.0)).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(means.iter().enumerate().map(|(i, m)| {
        Text::new(
            thousands(*m, 0),
            (SegmentValue::CenterOf(i as u32), *m + y_max * 0.01),
            value_style.clone(),
        )
    }))?;
    Ok(())
}

fn draw_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    stats: &[(AgeBracket, GroupStats)],
    font: &FontChoice,
) -> Result<(), ChartError> {
    let area = area.titled(
        font.pick("各年龄段理赔总金额占比", "Share of total claim amount"),
        font.bold(20.0),
    )?;

    // Empty brackets have no slice.
    let labels = bracket_labels(stats, font);
    let mut sizes = Vec::new();
    let mut colors = Vec::new();
    let mut slice_labels = Vec::new();
    for (i, (_, s)) in stats.iter().enumerate() {
        if s.total > 0.0 {
            sizes.push(s.total);
            colors.push(palette::PIE_COLORS[i % palette::PIE_COLORS.len()]);
            slice_labels.push(labels[i].to_string());
        }
    }
    if sizes.is_empty() {
        return Ok(());
    }

    // Pie takes backend pixels, not panel-relative ones.
    let (x0, y0) = area.get_base_pixel();
    let (w, h) = area.dim_in_pixel();
    let center = (x0 + (w / 2) as i32, y0 + (h / 2) as i32);
    let radius = f64::from(w.min(h)) * 0.32;
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &slice_labels);
    pie.start_angle(-90.0);
    pie.label_style(font.desc(16.0).color(&BLACK));
    pie.percentages(font.bold(15.0).color(&WHITE));
    area.draw(&pie)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> Vec<(AgeBracket, GroupStats)> {
        AgeBracket::ALL
            .into_iter()
            .zip([4000.0, 9000.0, 7000.0, 2000.0])
            .map(|(bracket, total)| {
                (
                    bracket,
                    GroupStats {
                        count: 2,
                        total,
                        mean: total / 2.0,
                    },
                )
            })
            .collect()
    }

    /// Pixels of `color` in the left and right halves of an RGB buffer.
    fn count_by_half(buf: &[u8], width: u32, color: RGBColor) -> (usize, usize) {
        let mut halves = (0, 0);
        for (i, px) in buf.chunks_exact(3).enumerate() {
            if px == [color.0, color.1, color.2] {
                if (i as u32 % width) < width / 2 {
                    halves.0 += 1;
                } else {
                    halves.1 += 1;
                }
            }
        }
        halves
    }

    #[test]
    fn test_pie_stays_in_right_panel() {
        let mut buf = vec![255u8; (SIZE.0 * SIZE.1 * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, SIZE).into_drawing_area();
            let (_, right) = root.split_horizontally((SIZE.0 / 2) as i32);
            draw_pie(&right, &sample_stats(), &FontChoice::fallback()).unwrap();
            root.present().unwrap();
        }
        let (left, right) = count_by_half(&buf, SIZE.0, palette::PIE_COLORS[2]);
        assert_eq!(left, 0);
        assert!(right > 1000, "only {} slice pixels in the right panel", right);
    }

    #[test]
    fn test_bars_left_pie_right() {
        let mut buf = vec![0u8; (SIZE.0 * SIZE.1 * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, SIZE).into_drawing_area();
            draw(&root, &sample_stats(), &FontChoice::fallback()).unwrap();
            root.present().unwrap();
        }
        let (bars_left, bars_right) = count_by_half(&buf, SIZE.0, palette::BAR_FILL);
        assert!(bars_left > 0);
        assert_eq!(bars_right, 0);
        for color in palette::PIE_COLORS {
            let (left, right) = count_by_half(&buf, SIZE.0, color);
            assert_eq!(left, 0);
            assert!(right > 0);
        }
    }

    #[test]
    fn test_empty_brackets_draw_no_slice() {
        let mut stats = sample_stats();
        for (_, s) in stats.iter_mut() {
            *s = GroupStats::default();
        }
        let mut buf = vec![255u8; (SIZE.0 * SIZE.1 * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, SIZE).into_drawing_area();
            draw(&root, &stats, &FontChoice::fallback()).unwrap();
            root.present().unwrap();
        }
        for color in palette::PIE_COLORS {
            assert_eq!(count_by_half(&buf, SIZE.0, color), (0, 0));
        }
    }
}
