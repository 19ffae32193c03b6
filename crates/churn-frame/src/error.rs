use churn_core::TensorError;
use thiserror::Error;

/// Errors produced by frame and row-tag operations.
#[derive(Debug, Error, Clone)]
pub enum FrameError {
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Duplicate column: {name}")]
    DuplicateColumn { name: String },

    #[error("Row count mismatch: expected {expected}, got {got}")]
    RowCountMismatch { expected: usize, got: usize },

    #[error("Column count mismatch: {names} names for {cols} data columns")]
    ColumnCountMismatch { names: usize, cols: usize },

    #[error("Unknown row tag: {value:?} (expected \"train\" or \"predict\")")]
    UnknownTag { value: String },

    #[error(transparent)]
    Tensor(#[from] TensorError),
}

pub type FrameResult<T> = Result<T, FrameError>;
