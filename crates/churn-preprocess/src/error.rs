use churn_core::TensorError;
use churn_frame::FrameError;
use thiserror::Error;

/// Errors produced by preprocessing steps.
#[derive(Debug, Error, Clone)]
pub enum PreprocessError {
    #[error("Sample too small for normality test: {n} values, need at least {min}")]
    SampleTooSmall { n: usize, min: usize },

    #[error("Sample too large for normality test: {n} values, limit is {max}")]
    SampleTooLarge { n: usize, max: usize },

    #[error("Degenerate sample: all values identical")]
    ConstantSample,

    #[error("Empty {tag} partition after tag split")]
    EmptyPartition { tag: String },

    #[error("Row count mismatch: {x} feature rows vs {y} labels")]
    LengthMismatch { x: usize, y: usize },

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Tensor(#[from] TensorError),
}

pub type PreprocessResult<T> = Result<T, PreprocessError>;
