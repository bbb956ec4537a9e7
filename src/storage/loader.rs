//! Relational loader stage: flat file in, one fully replaced table out.

use log::{debug, error, info};

use crate::configuration::Config;
use crate::dataset::read_raw;
use crate::error_handling::types::{PipelineError, StorageError};
use crate::storage::database_storage::{quote_ident, DatabaseStorage};
use crate::storage::storage_trait::Storage;
use crate::storage::types::{ResultTable, TableData};

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub rows_loaded: usize,
    pub preview: ResultTable,
}

/// Reads the flat file and replace-loads it into the configured table.
///
/// Column types come from the file contents, no schema is enforced. The
/// connection is closed before returning, on success and on failure.
pub fn run(config: &Config) -> Result<LoadSummary, PipelineError> {
    let raw = read_raw(&config.paths.claims_csv)?;
    info!(
        "Read {} row(s) from {}",
        raw.rows.len(),
        config.paths.claims_csv.display()
    );
    let table = TableData::from_raw(&config.paths.table, raw);

    let storage = DatabaseStorage::new_file(&config.paths.database)?;
    let result = load_into(&storage, &table);
    storage.close();
    let summary = result?;

    info!(
        "Loaded {} row(s) into table `{}` of {}",
        summary.rows_loaded,
        config.paths.table,
        config.paths.database.display()
    );
    println!("Table preview:");
    print!("{}", summary.preview);
    Ok(summary)
}

pub fn load_into(storage: &dyn Storage, table: &TableData) -> Result<LoadSummary, PipelineError> {
    let rows_loaded = storage.replace_table(table)?;
    let stored = storage.row_count(&table.name)?;
    if stored != rows_loaded {
        error!(
            "Table `{}` holds {} row(s) after loading {}",
            table.name, stored, rows_loaded
        );
        return Err(StorageError::WriteFailed(format!(
            "expected {} row(s) in `{}`, found {}",
            rows_loaded, table.name, stored
        ))
        .into());
    }
    debug!("Row count of `{}` verified: {}", table.name, stored);
    let preview = storage.query(&format!(
        "SELECT * FROM {} LIMIT {}",
        quote_ident(&table.name),
        PREVIEW_ROWS
    ))?;
    Ok(LoadSummary {
        rows_loaded,
        preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::config::parse_timestamp;
    use crate::dataset::write_records;
    use crate::generator::ClaimGenerator;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.claims_csv = dir.path().join("data").join("claims.csv");
        config.paths.database = dir.path().join("insurance.db");
        config
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let anchor = parse_timestamp("2025-03-01 09:00:00").unwrap();
        let records = ClaimGenerator::seeded(42, anchor).generate(200);
        write_records(&config.paths.claims_csv, &records).unwrap();

        let snapshot = |config: &Config| {
            let storage = DatabaseStorage::new_file(&config.paths.database).unwrap();
            let table = storage
                .query("SELECT * FROM claims ORDER BY 保单号")
                .unwrap();
            storage.close();
            table
        };

        let first = run(&config).unwrap();
        let first_snapshot = snapshot(&config);
        let second = run(&config).unwrap();
        let second_snapshot = snapshot(&config);

        assert_eq!(first.rows_loaded, 200);
        assert_eq!(second.rows_loaded, 200);
        assert_eq!(first.preview.rows.len(), PREVIEW_ROWS);
        assert_eq!(first_snapshot.rows.len(), 200);
        assert_eq!(first_snapshot, second_snapshot);
    }

    #[test]
    fn test_column_types_follow_file_contents() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let anchor = parse_timestamp("2025-03-01 09:00:00").unwrap();
        write_records(
            &config.paths.claims_csv,
            &ClaimGenerator::seeded(3, anchor).generate(20),
        )
        .unwrap();
        run(&config).unwrap();

        let storage = DatabaseStorage::new_file(&config.paths.database).unwrap();
        let types = storage
            .query("SELECT typeof(客户年龄), typeof(\"理赔金额(元)\"), typeof(出险时间) FROM claims LIMIT 1")
            .unwrap();
        storage.close();
        assert_eq!(types.rows[0][0].as_str(), Some("integer"));
        assert_eq!(types.rows[0][1].as_str(), Some("real"));
        assert_eq!(types.rows[0][2].as_str(), Some("text"));
    }

    #[test]
    fn test_ragged_file_loads_weakly_typed() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        std::fs::create_dir_all(config.paths.claims_csv.parent().unwrap()).unwrap();
        std::fs::write(
            &config.paths.claims_csv,
            "保单号,客户年龄,理赔金额(元)\nLB1,30\nLB2,forty,100.5,extra\n",
        )
        .unwrap();

        let summary = run(&config).unwrap();
        assert_eq!(summary.rows_loaded, 2);

        let storage = DatabaseStorage::new_file(&config.paths.database).unwrap();
        let types = storage
            .query("SELECT typeof(客户年龄), typeof(\"理赔金额(元)\") FROM claims ORDER BY 保单号")
            .unwrap();
        storage.close();
        assert_eq!(types.rows[0][0].as_str(), Some("text"));
        assert_eq!(types.rows[0][1].as_str(), Some("null"));
        assert_eq!(types.rows[1][1].as_str(), Some("real"));
    }

    #[test]
    fn test_missing_flat_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        assert!(matches!(run(&config), Err(PipelineError::DatasetError(_))));
    }
}
