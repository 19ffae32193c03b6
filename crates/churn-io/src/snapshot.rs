use crate::csv_io::Dataset;
use crate::error::DataResult;
use churn_frame::{Frame, RowTag};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Column-major re-encoding of a parsed [`Dataset`].
///
/// Written once after the raw CSV parse so later steps (and re-runs against
/// the same input) can skip the row-wise parse. A caching convenience, not a
/// durable store — the format carries no version field on purpose.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    user_ids: Vec<String>,
    tags: Vec<String>,
    columns: Vec<(String, Vec<f64>)>,
}

impl Snapshot {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let columns = dataset
            .frame
            .columns()
            .iter()
            .map(|name| {
                let values = dataset
                    .frame
                    .column(name)
                    .map(|t| t.into_data())
                    .unwrap_or_default();
                (name.clone(), values)
            })
            .collect();
        Snapshot {
            user_ids: dataset.user_ids.clone(),
            tags: dataset.tags.iter().map(|t| t.as_str().to_string()).collect(),
            columns,
        }
    }

    pub fn into_dataset(self) -> DataResult<Dataset> {
        let tags: Vec<RowTag> = self
            .tags
            .iter()
            .map(|t| t.parse::<RowTag>())
            .collect::<Result<_, _>>()?;
        Ok(Dataset {
            user_ids: self.user_ids,
            tags,
            frame: Frame::from_columns(self.columns)?,
        })
    }
}

/// Serialize the dataset to a columnar snapshot file.
pub fn write_snapshot(path: &Path, dataset: &Dataset) -> DataResult<()> {
    let snapshot = Snapshot::from_dataset(dataset);
    let encoded = serde_json::to_string(&snapshot)?;
    fs::write(path, encoded)?;
    Ok(())
}

/// Read a columnar snapshot back into a dataset.
pub fn read_snapshot(path: &Path) -> DataResult<Dataset> {
    let encoded = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&encoded)?;
    snapshot.into_dataset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let dataset = Dataset {
            user_ids: vec!["u1".to_string(), "u2".to_string()],
            tags: vec![RowTag::Train, RowTag::Predict],
            frame: Frame::from_columns(vec![
                ("plays".to_string(), vec![10.5, 3.0]),
                ("actions".to_string(), vec![2.0, 0.0]),
            ])
            .unwrap(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        write_snapshot(&path, &dataset).unwrap();

        let restored = read_snapshot(&path).unwrap();
        assert_eq!(restored.user_ids, dataset.user_ids);
        assert_eq!(restored.tags, dataset.tags);
        assert_eq!(restored.frame.columns(), dataset.frame.columns());
        assert_eq!(
            restored.frame.column("actions").unwrap().data(),
            dataset.frame.column("actions").unwrap().data()
        );
    }
}
