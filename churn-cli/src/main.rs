//! Command-line entry point for the churn prediction pipeline.
//!
//! Usage: `churn-cli [config.json]`. Without an argument the default
//! configuration paths are used. Log verbosity follows `RUST_LOG`.

use std::path::Path;

use churn_pipeline::{run, PipelineConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::from_path(Path::new(&path))?,
        None => PipelineConfig::default(),
    };

    let report = run(&config)?;
    println!(
        "roc_auc={:.4} mse={:.4} balanced_accuracy={:.4} recall={:.4}",
        report.roc_auc, report.mse, report.balanced_accuracy, report.recall
    );
    Ok(())
}
