use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use super::fonts::FontChoice;
use super::palette::{annotation_color, normalize, ylorrd};
use crate::analysis::aggregates::CrossTab;
use crate::analysis::format::thousands;
use crate::error_handling::types::ChartError;

const SIZE: (u32, u32) = (1100, 640);
const GRID_WIDTH: i32 = 920;
const ROW_LABEL_WIDTH: i32 = 190;
const COLUMN_LABEL_HEIGHT: i32 = 50;
const PADDING: i32 = 15;
const COLORBAR_STEPS: i32 = 120;
const COLORBAR_TICKS: usize = 5;

/// Heat map of mean claim amount, causes as rows and vehicle categories as columns.
pub fn render(path: &Path, tab: &CrossTab, font: &FontChoice) -> Result<(), ChartError> {
    if tab.causes.is_empty() || tab.categories.is_empty() {
        return Err(ChartError::RenderError(
            "cross tabulation is empty".to_string(),
        ));
    }
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    draw(&root, tab, font)?;
    root.present()?;
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    tab: &CrossTab,
    font: &FontChoice,
) -> Result<(), ChartError> {
    root.fill(&WHITE)?;
    let root = root.titled(
        font.pick(
            "不同出险原因与车型的平均理赔金额热力图 (元)",
            "Mean claim amount by cause and vehicle category (CNY)",
        ),
        font.bold(22.0),
    )?;
    let (grid, bar) = root.split_horizontally(GRID_WIDTH);
    let (lo, hi) = (tab.min(), tab.max());
    draw_grid(&grid, tab, lo, hi, font)?;
    draw_colorbar(&bar, lo, hi, font)
}

/// Cell geometry of the grid panel, in panel pixels.
struct GridLayout {
    cell_w: i32,
    cell_h: i32,
}

impl GridLayout {
    fn new((w, h): (u32, u32), rows: usize, cols: usize) -> Self {
        Self {
            cell_w: (w as i32 - ROW_LABEL_WIDTH - PADDING) / cols.max(1) as i32,
            cell_h: (h as i32 - COLUMN_LABEL_HEIGHT - 2 * PADDING) / rows.max(1) as i32,
        }
    }

    fn cell(&self, row: usize, col: usize) -> [(i32, i32); 2] {
        let x0 = ROW_LABEL_WIDTH + col as i32 * self.cell_w;
        let y0 = PADDING + row as i32 * self.cell_h;
        [(x0, y0), (x0 + self.cell_w, y0 + self.cell_h)]
    }

    fn center(&self, row: usize, col: usize) -> (i32, i32) {
        let [(x0, y0), _] = self.cell(row, col);
        (x0 + self.cell_w / 2, y0 + self.cell_h / 2)
    }
}

fn draw_grid<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    tab: &CrossTab,
    lo: f64,
    hi: f64,
    font: &FontChoice,
) -> Result<(), ChartError> {
    let layout = GridLayout::new(area.dim_in_pixel(), tab.causes.len(), tab.categories.len());
    let centered = |size: f64| TextStyle::from(font.desc(size)).pos(Pos::new(HPos::Center, VPos::Center));

    for (i, row) in tab.means.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            area.draw(&Rectangle::new(
                layout.cell(i, j),
                ylorrd(normalize(*value, lo, hi)).filled(),
            ))?;
            area.draw(&Text::new(
                thousands(*value, 0),
                layout.center(i, j),
                centered(15.0).color(&annotation_color(*value, hi)),
            ))?;
        }
    }

    let row_style = TextStyle::from(font.desc(15.0)).pos(Pos::new(HPos::Right, VPos::Center));
    for (i, cause) in tab.causes.iter().enumerate() {
        let (_, y) = layout.center(i, 0);
        area.draw(&Text::new(
            font.pick(cause.label(), cause.ascii_label()),
            (ROW_LABEL_WIDTH - 10, y),
            row_style.clone(),
        ))?;
    }

    let [_, (_, grid_bottom)] = layout.cell(tab.causes.len().saturating_sub(1), 0);
    let column_y = grid_bottom + COLUMN_LABEL_HEIGHT / 2;
    for (j, category) in tab.categories.iter().enumerate() {
        let (x, _) = layout.center(0, j);
        area.draw(&Text::new(
            font.pick(category.label(), category.ascii_label()),
            (x, column_y),
            centered(15.0),
        ))?;
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lo: f64,
    hi: f64,
    font: &FontChoice,
) -> Result<(), ChartError> {
    let (_, h) = area.dim_in_pixel();
    let (x0, x1) = (10, 40);
    let top = PADDING;
    let bottom = h as i32 - COLUMN_LABEL_HEIGHT - PADDING;
    let span = (bottom - top).max(1);

    for step in 0..COLORBAR_STEPS {
        let y_hi = bottom - span * (step + 1) / COLORBAR_STEPS;
        let y_lo = bottom - span * step / COLORBAR_STEPS;
        let t = (f64::from(step) + 0.5) / f64::from(COLORBAR_STEPS);
        area.draw(&Rectangle::new([(x0, y_hi), (x1, y_lo)], ylorrd(t).filled()))?;
    }
    area.draw(&Rectangle::new([(x0, top), (x1, bottom)], BLACK.stroke_width(1)))?;

    let tick_style = TextStyle::from(font.desc(13.0)).pos(Pos::new(HPos::Left, VPos::Center));
    for k in 0..COLORBAR_TICKS {
        let frac = k as f64 / (COLORBAR_TICKS - 1) as f64;
        let y = bottom - (f64::from(span) * frac).round() as i32;
        area.draw(&PathElement::new(
            vec![(x1, y), (x1 + 5, y)],
            BLACK.stroke_width(1),
        ))?;
        area.draw(&Text::new(
            thousands(lo + (hi - lo) * frac, 0),
            (x1 + 8, y),
            tick_style.clone(),
        ))?;
    }

    let label_style = TextStyle::from(font.desc(15.0).transform(FontTransform::Rotate90))
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        font.pick("平均理赔金额 (元)", "Mean claim (CNY)"),
        (x1 + 110, top + span / 2),
        label_style,
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::{ClaimCause, VehicleCategory};

    fn sample_tab() -> CrossTab {
        CrossTab {
            causes: vec![ClaimCause::Collision, ClaimCause::Theft],
            categories: vec![VehicleCategory::Economy, VehicleCategory::Luxury],
            means: vec![vec![800.0, 12000.0], vec![30000.0, 90000.0]],
        }
    }

    /// Pixels of `color` strictly inside a cell, borders excluded.
    fn pixels_in_cell(buf: &[u8], width: u32, cell: [(i32, i32); 2], color: RGBColor) -> usize {
        let [(x0, y0), (x1, y1)] = cell;
        let mut found = 0;
        for y in (y0 + 2)..(y1 - 2) {
            for x in (x0 + 2)..(x1 - 2) {
                let at = ((y as u32 * width + x as u32) * 3) as usize;
                if buf[at..at + 3] == [color.0, color.1, color.2] {
                    found += 1;
                }
            }
        }
        found
    }

    #[test]
    fn test_annotation_contrasts_with_cell() {
        let tab = sample_tab();
        let (lo, hi) = (tab.min(), tab.max());
        let size = (GRID_WIDTH as u32, SIZE.1);
        let mut buf = vec![255u8; (size.0 * size.1 * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, size).into_drawing_area();
            draw_grid(&root, &tab, lo, hi, &FontChoice::fallback()).unwrap();
            root.present().unwrap();
        }
        let layout = GridLayout::new(size, 2, 2);

        let darkest = layout.cell(1, 1);
        assert!(pixels_in_cell(&buf, size.0, darkest, ylorrd(1.0)) > 0);
        assert!(pixels_in_cell(&buf, size.0, darkest, WHITE) > 0);
        assert_eq!(pixels_in_cell(&buf, size.0, darkest, BLACK), 0);

        let lightest = layout.cell(0, 0);
        assert!(pixels_in_cell(&buf, size.0, lightest, ylorrd(0.0)) > 0);
        assert!(pixels_in_cell(&buf, size.0, lightest, BLACK) > 0);
        assert_eq!(pixels_in_cell(&buf, size.0, lightest, WHITE), 0);
    }

    #[test]
    fn test_cells_tile_without_overlap() {
        let layout = GridLayout::new((GRID_WIDTH as u32, SIZE.1), 4, 3);
        let [_, (right, _)] = layout.cell(0, 0);
        let [(next, _), _] = layout.cell(0, 1);
        assert_eq!(right, next);
        let [_, (x1, y1)] = layout.cell(3, 2);
        assert!(x1 <= GRID_WIDTH - PADDING);
        assert!(y1 <= SIZE.1 as i32 - COLUMN_LABEL_HEIGHT - PADDING);
    }

    #[test]
    fn test_empty_tab_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let tab = CrossTab {
            causes: vec![],
            categories: vec![],
            means: vec![],
        };
        let path = dir.path().join("heat.png");
        let result = render(&path, &tab, &FontChoice::fallback());
        assert!(matches!(result, Err(ChartError::RenderError(_))));
        assert!(!path.exists());
    }
}
