use churn_frame::FrameError;
use thiserror::Error;

/// Errors produced while reading or writing pipeline data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Snapshot encode/decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Required column missing from input: {name}")]
    MissingColumn { name: String },

    #[error("Non-numeric value {value:?} in column {column} at line {line}")]
    BadNumber {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Ragged row at line {line}: expected {expected} fields, got {got}")]
    RaggedRow {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Frame(#[from] FrameError),
}

pub type DataResult<T> = Result<T, DataError>;
