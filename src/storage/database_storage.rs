use std::path::Path;

use log::{debug, error, info};
use sqlx::{
    query::Query,
    sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Column, Pool, Row, TypeInfo, ValueRef,
};

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::Storage;
use crate::storage::types::{CellValue, ColumnType, ResultTable, TableData};

/// SQLite-backed relational store.
///
/// The pool is driven by a private current-thread runtime so the pipeline
/// stages stay synchronous. A single connection is kept, matching the
/// single-writer semantics of the database file.
pub struct DatabaseStorage {
    rt: tokio::runtime::Runtime,
    pool: Pool<Sqlite>,
}

impl DatabaseStorage {
    /// Opens the database file, creating it and its parent directory if missing.
    pub fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create database dir {}: {}", parent.display(), e);
                StorageError::WriteFailed(e.to_string())
            })?;
        }
        let pool = rt.block_on(async {
            let opts = SqliteConnectOptions::new()
                .filename(path_ref)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(opts)
                .await
                .map_err(|e| {
                    error!("Failed to open database {}: {}", path_ref.display(), e);
                    StorageError::ConnectionFailed(e.to_string())
                })
        })?;
        debug!("Opened database {}", path_ref.display());
        Ok(Self { rt, pool })
    }

    /// Closes the pool, releasing the database file for later stages.
    pub fn close(self) {
        self.rt.block_on(self.pool.close());
        debug!("Database connection closed");
    }
}

impl Storage for DatabaseStorage {
    fn replace_table(&self, table: &TableData) -> Result<usize, StorageError> {
        let ident = quote_ident(&table.name);
        let column_defs = table
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.column_type.sql_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let column_names = table
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; table.columns.len()].join(", ");
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            ident, column_names, placeholders
        );

        self.rt.block_on(async {
            let write_err = |e: sqlx::Error| StorageError::WriteFailed(e.to_string());
            let mut tx = self.pool.begin().await.map_err(write_err)?;
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", ident))
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
            sqlx::query(&format!("CREATE TABLE {} ({})", ident, column_defs))
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
            for row in &table.rows {
                let mut q = sqlx::query(&insert_sql);
                for (i, column) in table.columns.iter().enumerate() {
                    let raw = row.get(i).map(|s| s.trim()).unwrap_or("");
                    q = bind_cell(q, column.column_type, raw);
                }
                q.execute(&mut *tx).await.map_err(write_err)?;
            }
            tx.commit().await.map_err(write_err)?;
            Ok::<_, StorageError>(())
        })?;

        info!("Replaced table {} with {} row(s)", table.name, table.rows.len());
        Ok(table.rows.len())
    }

    fn query(&self, sql: &str) -> Result<ResultTable, StorageError> {
        let rows: Vec<SqliteRow> = self.rt.block_on(async {
            sqlx::query(sql).fetch_all(&self.pool).await.map_err(|e| {
                error!("Query failed: {}", e);
                StorageError::QueryFailed(e.to_string())
            })
        })?;

        let columns = rows
            .first()
            .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut cells = Vec::with_capacity(row.len());
            for i in 0..row.len() {
                cells.push(decode_cell(row, i)?);
            }
            out.push(cells);
        }
        debug!("Query returned {} row(s)", out.len());
        Ok(ResultTable { columns, rows: out })
    }

    fn row_count(&self, table: &str) -> Result<usize, StorageError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = self.rt.block_on(async {
            sqlx::query_scalar(&sql)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StorageError::QueryFailed(e.to_string()))
        })?;
        Ok(count as usize)
    }
}

/// Quotes an identifier so headers such as `理赔金额(元)` are valid column names.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bind_cell<'q>(
    q: Query<'q, Sqlite, SqliteArguments<'q>>,
    column_type: ColumnType,
    raw: &str,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    if raw.is_empty() {
        return q.bind(None::<String>);
    }
    match column_type {
        ColumnType::Integer => q.bind(raw.parse::<i64>().ok()),
        ColumnType::Real => q.bind(raw.parse::<f64>().ok()),
        ColumnType::Text => q.bind(raw.to_string()),
    }
}

fn decode_cell(row: &SqliteRow, index: usize) -> Result<CellValue, StorageError> {
    let read_err = |e: sqlx::Error| StorageError::ReadFailed(e.to_string());
    let type_name = {
        let raw = row.try_get_raw(index).map_err(read_err)?;
        if raw.is_null() {
            return Ok(CellValue::Null);
        }
        raw.type_info().name().to_string()
    };
    match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(index).map(CellValue::Integer),
        "REAL" | "NUMERIC" => row.try_get::<f64, _>(index).map(CellValue::Real),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(|b| CellValue::Text(format!("<{} bytes>", b.len()))),
        _ => row.try_get::<String, _>(index).map(CellValue::Text),
    }
    .map_err(read_err)
}
