use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Could not parse settings file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    // Fatal for the whole batch: no partial result is produced.
    #[error("Missing required column '{column}' in {table} table")]
    MissingColumn { table: String, column: String },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    pub fn missing_column(table: &str, column: &str) -> Self {
        EngineError::MissingColumn { table: table.to_string(), column: column.to_string() }
    }

    pub fn is_schema_error(&self) -> bool {
        matches!(self, EngineError::MissingColumn { .. })
    }
}
