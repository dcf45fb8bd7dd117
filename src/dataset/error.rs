use crate::dataset::table::Table;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("No {table} file ('{stem}.parquet' or '{stem}.csv') found in '{dir}'")]
    MissingFile {
        table: Table,
        stem: &'static str,
        dir: PathBuf,
    },

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Failed to scan parquet file '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("Required column '{column}' not found in {table} table")]
    MissingColumn { table: Table, column: &'static str },

    #[error("Failed to normalize column types of the {table} table")]
    Normalize {
        table: Table,
        #[source]
        source: PolarsError,
    },

    #[error("{count} row(s) of the {table} table have a missing or malformed date (expected YYYY-MM-DD)")]
    InvalidDates { table: Table, count: usize },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
