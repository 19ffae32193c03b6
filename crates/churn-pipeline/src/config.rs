use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Run configuration for the churn pipeline.
///
/// Any field left out of the file keeps its default, so a minimal config
/// only names the three paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw delimited dataset.
    pub input_path: PathBuf,
    /// Columnar snapshot written after the load stage.
    pub snapshot_path: PathBuf,
    /// Prediction table destination.
    pub output_path: PathBuf,
    /// Seed shared by the resampler and the evaluation split.
    pub seed: u64,
    /// Fraction of the resampled training data held out for evaluation.
    pub eval_fraction: f64,
    /// Boosting rounds.
    pub n_estimators: usize,
    /// Shrinkage applied to each round's tree.
    pub learning_rate: f64,
    /// Depth limit of each round's tree.
    pub max_depth: usize,
    /// Run date stamped on every output row, `YYYY-MM-DD`.
    /// Defaults to today (UTC) when absent.
    pub run_date: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_path: PathBuf::from("data/churn_dataset.csv"),
            snapshot_path: PathBuf::from("data/churn_snapshot.json"),
            output_path: PathBuf::from("data/churn_predictions.csv"),
            seed: 0,
            eval_fraction: 0.2,
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 5,
            run_date: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_path(path: &std::path::Path) -> Result<Self, crate::error::PipelineError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
