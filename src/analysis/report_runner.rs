//! Aggregation report runner stage.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDateTime, SubsecRound};
use log::{error, info};

use super::queries::{audit_script, standard_queries, AnalysisQuery};
use crate::configuration::Config;
use crate::dataset::flat_file::ensure_parent_dir;
use crate::error_handling::types::PipelineError;
use crate::storage::database_storage::DatabaseStorage;
use crate::storage::storage_trait::Storage;
use crate::storage::types::ResultTable;

const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryReport {
    pub query: AnalysisQuery,
    pub result: ResultTable,
}

/// Runs the three queries, prints each result and writes the audit script.
///
/// The store is closed before returning whether or not the queries succeeded.
pub fn run(config: &Config) -> Result<Vec<QueryReport>, PipelineError> {
    let storage = DatabaseStorage::new_file(&config.paths.database)?;
    let result = execute(&storage, &config.paths.table);
    storage.close();
    let reports = result?;

    println!("开始进行车险理赔数据探索分析...\n");
    println!("{}", "=".repeat(RULE_WIDTH));
    for (i, report) in reports.iter().enumerate() {
        println!("{}. 【{}】", i + 1, report.query.title);
        println!("{}", report.result);
    }
    println!("{}", "=".repeat(RULE_WIDTH));

    let queries: Vec<AnalysisQuery> = reports.iter().map(|r| r.query.clone()).collect();
    write_audit(
        &config.paths.sql_audit,
        &queries,
        Local::now().naive_local().trunc_subsecs(0),
    )?;
    info!(
        "Report complete; SQL saved to {}",
        config.paths.sql_audit.display()
    );
    Ok(reports)
}

pub fn execute(storage: &dyn Storage, table: &str) -> Result<Vec<QueryReport>, PipelineError> {
    standard_queries(table)
        .into_iter()
        .map(|query| {
            let result = storage.query(&query.sql)?;
            info!("{}: {} group(s)", query.title, result.rows.len());
            Ok(QueryReport { query, result })
        })
        .collect()
}

pub fn write_audit(
    path: &Path,
    queries: &[AnalysisQuery],
    generated_at: NaiveDateTime,
) -> Result<(), PipelineError> {
    ensure_parent_dir(path)?;
    fs::write(path, audit_script(queries, generated_at)).map_err(|e| {
        error!("Failed to write SQL audit file {}: {}", path.display(), e);
        PipelineError::IoError(e)
    })
}
