//! Flat claims file: a UTF-8 CSV with a byte-order mark and a header row.
//!
//! Two read paths exist. `read_records` deserializes typed `ClaimRecord`s for
//! stages that compute on the data; `read_raw` keeps every cell as text for
//! the relational loader, which infers column types itself.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, info};

use super::types::ClaimRecord;
use crate::error_handling::types::DatasetError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row and string cells of a flat file, without any type checks.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Writes all records, replacing the file. The parent directory is created if needed.
pub fn write_records(path: &Path, records: &[ClaimRecord]) -> Result<(), DatasetError> {
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(UTF8_BOM)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    info!("Wrote {} claim record(s) to {}", records.len(), path.display());
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<ClaimRecord>, DatasetError> {
    let bytes = fs::read(path)?;
    let mut reader = csv::Reader::from_reader(strip_bom(&bytes));
    let records = reader
        .deserialize()
        .collect::<Result<Vec<ClaimRecord>, csv::Error>>()?;
    debug!("Read {} claim record(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Rows may have more or fewer cells than the header; nothing is validated.
pub fn read_raw(path: &Path) -> Result<RawTable, DatasetError> {
    let bytes = fs::read(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(strip_bom(&bytes));
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row?.iter().map(str::to_string).collect());
    }
    debug!("Read {} raw row(s) from {}", rows.len(), path.display());
    Ok(RawTable { headers, rows })
}

pub(crate) fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}
