use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Data(#[from] churn_io::DataError),

    #[error(transparent)]
    Frame(#[from] churn_frame::FrameError),

    #[error(transparent)]
    Preprocess(#[from] churn_preprocess::PreprocessError),

    #[error(transparent)]
    Sampling(#[from] churn_sampling::SamplingError),

    #[error(transparent)]
    Tensor(#[from] churn_core::TensorError),

    #[error("date formatting failed: {0}")]
    DateFormat(#[from] time::error::Format),

    #[error("user '{id}' has no engagement record in the join table")]
    MissingUser { id: String },

    #[error("column '{name}' is not part of the dataset schema")]
    UnexpectedColumn { name: String },

    #[error("every continuous column tested as Gaussian; nothing to quantile-transform")]
    AllColumnsGaussian,
}

pub type PipelineResult<T> = Result<T, PipelineError>;
