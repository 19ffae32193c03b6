pub mod config;
pub mod error;
pub mod pipeline;
pub mod schema;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{run, EvaluationReport};
