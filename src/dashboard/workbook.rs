//! Spreadsheet export stage.
//!
//! Sheets:
//! - `原始数据`: one row per claim, for external pivoting.
//! - `月度趋势`: claim count and amounts per calendar month.
//! - `维度汇总`: per vehicle category rows followed by per claim cause rows.

use std::path::Path;

use chrono::{Datelike, Timelike};
use log::{error, info};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet, XlsxError};

use super::builder::load_records;
use crate::analysis::aggregates::{dimension_summary, monthly_summary};
use crate::analysis::format::round2;
use crate::configuration::Config;
use crate::dataset::flat_file::ensure_parent_dir;
use crate::dataset::ClaimRecord;
use crate::error_handling::types::{ExportError, PipelineError};

pub const RAW_SHEET: &str = "原始数据";
pub const MONTHLY_SHEET: &str = "月度趋势";
pub const DIMENSION_SHEET: &str = "维度汇总";

const RAW_HEADERS: [&str; 8] = [
    "出险时间",
    "出险年份",
    "出险月份",
    "车型类别",
    "客户年龄",
    "投保地区",
    "出险原因",
    "理赔金额(元)",
];
const MONTHLY_HEADERS: [&str; 6] = [
    "出险年份",
    "出险月份",
    "理赔次数",
    "总理赔金额",
    "平均理赔金额",
    "年月",
];
const DIMENSION_HEADERS: [&str; 4] = ["维度值", "理赔次数", "总理赔金额", "维度"];

pub fn run(config: &Config) -> Result<(), PipelineError> {
    let records = load_records(config)?;
    write_workbook(&config.paths.workbook, &records)?;
    info!(
        "Dashboard workbook with {} record(s) saved to {}",
        records.len(),
        config.paths.workbook.display()
    );
    println!("Workbook saved to {}", config.paths.workbook.display());
    Ok(())
}

pub fn write_workbook(path: &Path, records: &[ClaimRecord]) -> Result<(), ExportError> {
    ensure_parent_dir(path)?;
    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    write_raw_sheet(workbook.add_worksheet().set_name(RAW_SHEET)?, records, &header)?;
    write_monthly_sheet(
        workbook.add_worksheet().set_name(MONTHLY_SHEET)?,
        records,
        &header,
    )?;
    write_dimension_sheet(
        workbook.add_worksheet().set_name(DIMENSION_SHEET)?,
        records,
        &header,
    )?;

    workbook.save(path).map_err(|e| {
        error!("Failed to save workbook {}: {}", path.display(), e);
        ExportError::from(e)
    })
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<(), XlsxError> {
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, format)?;
        sheet.set_column_width(col as u16, 14)?;
    }
    Ok(())
}

fn write_raw_sheet(
    sheet: &mut Worksheet,
    records: &[ClaimRecord],
    header: &Format,
) -> Result<(), XlsxError> {
    write_headers(sheet, &RAW_HEADERS, header)?;
    sheet.set_column_width(0, 20)?;
    let datetime = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        let at = &record.claimed_at;
        let excel_at = ExcelDateTime::from_ymd(at.year() as u16, at.month() as u8, at.day() as u8)?
            .and_hms(at.hour() as u16, at.minute() as u8, at.second() as u8)?;
        sheet.write_datetime_with_format(row, 0, &excel_at, &datetime)?;
        sheet.write_number(row, 1, at.year())?;
        sheet.write_number(row, 2, at.month())?;
        sheet.write_string(row, 3, record.vehicle_category.label())?;
        sheet.write_number(row, 4, record.age)?;
        sheet.write_string(row, 5, record.region.label())?;
        sheet.write_string(row, 6, record.claim_cause.label())?;
        sheet.write_number(row, 7, record.claim_amount)?;
    }
    Ok(())
}

fn write_monthly_sheet(
    sheet: &mut Worksheet,
    records: &[ClaimRecord],
    header: &Format,
) -> Result<(), XlsxError> {
    write_headers(sheet, &MONTHLY_HEADERS, header)?;
    for (i, month) in monthly_summary(records).iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, month.month.year)?;
        sheet.write_number(row, 1, month.month.month)?;
        sheet.write_number(row, 2, month.stats.count as f64)?;
        sheet.write_number(row, 3, round2(month.stats.total))?;
        sheet.write_number(row, 4, round2(month.stats.mean))?;
        sheet.write_string(row, 5, month.month.chinese_label())?;
    }
    Ok(())
}

fn write_dimension_sheet(
    sheet: &mut Worksheet,
    records: &[ClaimRecord],
    header: &Format,
) -> Result<(), XlsxError> {
    write_headers(sheet, &DIMENSION_HEADERS, header)?;
    for (i, dim) in dimension_summary(records).iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, &dim.value)?;
        sheet.write_number(row, 1, dim.count as f64)?;
        sheet.write_number(row, 2, dim.total)?;
        sheet.write_string(row, 3, dim.dimension)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use calamine::{open_workbook, Data, Reader, Xlsx};
    use tempfile::TempDir;

    use crate::analysis::aggregates::{DIMENSION_CLAIM_CAUSE, DIMENSION_VEHICLE_CATEGORY};
    use crate::configuration::config::parse_timestamp;
    use crate::generator::ClaimGenerator;

    fn numeric(cell: &Data) -> f64 {
        match cell {
            Data::Float(v) => *v,
            Data::Int(v) => *v as f64,
            other => panic!("expected a number, found {:?}", other),
        }
    }

    fn header_row(range: &calamine::Range<Data>) -> Vec<String> {
        range
            .rows()
            .next()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_workbook_written_under_new_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("dashboard.xlsx");
        let anchor = parse_timestamp("2024-11-24 10:30:00").unwrap();
        let records = ClaimGenerator::seeded(42, anchor).generate(50);

        write_workbook(&path, &records).unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(book.sheet_names(), vec![RAW_SHEET, MONTHLY_SHEET, DIMENSION_SHEET]);

        let raw = book.worksheet_range(RAW_SHEET).unwrap();
        assert_eq!(header_row(&raw), RAW_HEADERS);
        assert_eq!(raw.height(), records.len() + 1);
        assert!(matches!(raw.get((1, 0)), Some(Data::DateTime(_))));
        let amounts: f64 = raw.rows().skip(1).map(|row| numeric(&row[7])).sum();
        let expected: f64 = records.iter().map(|r| r.claim_amount).sum();
        assert!((amounts - expected).abs() < 1e-6);

        let monthly = book.worksheet_range(MONTHLY_SHEET).unwrap();
        assert_eq!(header_row(&monthly), MONTHLY_HEADERS);
        let monthly_count: f64 = monthly.rows().skip(1).map(|row| numeric(&row[2])).sum();
        assert_eq!(monthly_count, records.len() as f64);
    }

    #[test]
    fn test_dimension_counts_cover_every_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard.xlsx");
        let anchor = parse_timestamp("2024-11-24 10:30:00").unwrap();
        let records = ClaimGenerator::seeded(7, anchor).generate(120);

        write_workbook(&path, &records).unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        let sheet = book.worksheet_range(DIMENSION_SHEET).unwrap();
        assert_eq!(header_row(&sheet), DIMENSION_HEADERS);

        let mut per_dimension: BTreeMap<String, f64> = BTreeMap::new();
        for row in sheet.rows().skip(1) {
            *per_dimension.entry(row[3].to_string()).or_default() += numeric(&row[1]);
        }
        assert_eq!(per_dimension.len(), 2);
        assert_eq!(per_dimension[DIMENSION_VEHICLE_CATEGORY], records.len() as f64);
        assert_eq!(per_dimension[DIMENSION_CLAIM_CAUSE], records.len() as f64);
    }

    #[test]
    fn test_export_without_flat_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.claims_csv = dir.path().join("missing.csv");
        config.paths.workbook = dir.path().join("out.xlsx");
        assert!(matches!(run(&config), Err(PipelineError::DatasetError(_))));
        assert!(!config.paths.workbook.exists());
    }
}
