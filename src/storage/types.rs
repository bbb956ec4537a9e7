use std::fmt;

use crate::dataset::RawTable;

/// SQLite column affinity inferred from the flat file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Narrowest type every non-empty value parses as. An all-empty column is TEXT.
    pub fn infer<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut inferred: Option<ColumnType> = None;
        for value in values.into_iter().map(str::trim).filter(|v| !v.is_empty()) {
            let current = if value.parse::<i64>().is_ok() {
                ColumnType::Integer
            } else if value.parse::<f64>().is_ok() {
                ColumnType::Real
            } else {
                return ColumnType::Text;
            };
            inferred = Some(match (inferred, current) {
                (Some(ColumnType::Real), _) | (_, ColumnType::Real) => ColumnType::Real,
                _ => ColumnType::Integer,
            });
        }
        inferred.unwrap_or(ColumnType::Text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

/// A full table ready to be bulk loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn from_raw(name: &str, raw: RawTable) -> Self {
        let columns = raw
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| ColumnDef {
                name: header.clone(),
                column_type: ColumnType::infer(
                    raw.rows.iter().map(|row| row.get(i).map(String::as_str).unwrap_or("")),
                ),
            })
            .collect();
        Self {
            name: name.to_string(),
            columns,
            rows: raw.rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Real(v) => write!(f, "{:.2}", v),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

/// Rows returned by a query, rendered as an aligned text table by `Display`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Numeric values of a column; non-numeric cells are skipped.
    pub fn f64_column(&self, name: &str) -> Vec<f64> {
        match self.column_index(name) {
            Some(i) => self.rows.iter().filter_map(|r| r[i].as_f64()).collect(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                rendered
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|s| display_width(s))
                    .chain(std::iter::once(display_width(c)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let pad = w.saturating_sub(display_width(cell));
                    format!("{}{}", " ".repeat(pad), cell)
                })
                .collect();
            writeln!(f, "{}", padded.join("  "))
        };

        line(f, &self.columns)?;
        for row in &rendered {
            line(f, row)?;
        }
        Ok(())
    }
}

/// Terminal column width, counting East Asian wide characters as two.
pub fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6 => 2,
            _ => 1,
        })
        .sum()
}
