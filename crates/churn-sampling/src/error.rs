use churn_core::TensorError;
use thiserror::Error;

/// Errors produced while rebalancing the training set.
#[derive(Debug, Error, Clone)]
pub enum SamplingError {
    #[error("Resampling requires two classes, found one")]
    SingleClass,

    #[error("Resampling requires binary labels, found {labels} distinct values")]
    NotBinary { labels: usize },

    #[error("Minority class has {count} samples, need at least 2 to interpolate")]
    TooFewMinority { count: usize },

    #[error("Cleaning removed every sample of class {label}")]
    ClassEliminated { label: u8 },

    #[error(transparent)]
    Tensor(#[from] TensorError),
}

pub type SamplingResult<T> = Result<T, SamplingError>;
