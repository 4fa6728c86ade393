use std::path::PathBuf;

use thiserror::Error;

/// Anything that prevents building the merged table. All variants are fatal
/// for the load that raised them.
#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed Parquet in {path}: {source}")]
    Parquet {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("unsupported file type for {path} (expected .csv or .parquet)")]
    UnsupportedFormat { path: PathBuf },

    #[error("{path}: column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType {
        path: PathBuf,
        column: String,
        data_type: String,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("{path}, row {row}: year '{value}' is not an integer")]
    YearCoercion {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("{path}, row {row}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
}
