//! In-memory dataset handling for the conversational data explorer
//!
//! Owns the table representation (arrow `RecordBatch` plus per-column kind
//! tags), CSV ingest, the schema profiler, and the query sandbox.

pub mod profile;
pub mod render;
pub mod sandbox;
pub mod sources;
pub mod table;

use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use profile::{profile, ColumnProfile, SchemaProfile};
pub use sandbox::{execute, QueryOutcome};
pub use sources::CsvSource;
pub use table::{ColumnKind, Dataset, QueryText, ResultTable};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(ArrowError),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("SQL execution error: {0}")]
    Sqlite(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("dataset has no rows")]
    EmptyDataset,

    #[error("Other error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Arrow(error)
    }
}

impl From<rusqlite::Error> for DataError {
    fn from(error: rusqlite::Error) -> Self {
        DataError::Sqlite(error.to_string())
    }
}

impl From<DataError> for dq_core::PipelineError {
    fn from(error: DataError) -> Self {
        use dq_core::PipelineError;
        match error {
            DataError::InvalidSchema(msg) => PipelineError::InvalidSchema(msg),
            DataError::EmptyDataset => PipelineError::EmptyDataset,
            DataError::Sqlite(msg) => PipelineError::Execution(msg),
            other => PipelineError::Internal(other.to_string()),
        }
    }
}
