use crate::error::DataResult;
use serde::Serialize;
use std::path::Path;

/// One row of the final prediction output.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRow {
    #[serde(rename = "user_primaryid")]
    pub user_id: String,
    #[serde(rename = "plays_L60D")]
    pub recent_plays: f64,
    pub churn_prediction: u8,
    pub churn_probability: f64,
    pub date: String,
}

/// Write the prediction table to a delimited file.
pub fn write_predictions(path: &Path, rows: &[PredictionRow]) -> DataResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_predictions() {
        let rows = vec![
            PredictionRow {
                user_id: "u1".to_string(),
                recent_plays: 12.0,
                churn_prediction: 1,
                churn_probability: 0.91,
                date: "2026-08-30".to_string(),
            },
            PredictionRow {
                user_id: "u2".to_string(),
                recent_plays: 48.0,
                churn_prediction: 0,
                churn_probability: 0.08,
                date: "2026-08-30".to_string(),
            },
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        write_predictions(&path, &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "user_primaryid,plays_L60D,churn_prediction,churn_probability,date"
        );
        assert_eq!(lines.next().unwrap(), "u1,12.0,1,0.91,2026-08-30");
        assert_eq!(lines.clone().count(), 1);
    }
}
