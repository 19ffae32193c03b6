use crate::error::{DataError, DataResult};
use churn_frame::{Frame, RowTag};
use std::path::Path;

/// One parsed snapshot of the raw table: text ids and row tags kept as side
/// vectors, everything else as a numeric frame. All three are row-aligned.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub user_ids: Vec<String>,
    pub tags: Vec<RowTag>,
    pub frame: Frame,
}

impl Dataset {
    pub fn n_rows(&self) -> usize {
        self.frame.n_rows()
    }
}

/// Read the raw delimited dataset.
///
/// `id_column` stays text, `tag_column` is parsed into [`RowTag`] (an unknown
/// tag value aborts the read), and every remaining column must parse as a
/// number. Header order is preserved in the returned frame.
pub fn read_dataset(path: &Path, id_column: &str, tag_column: &str) -> DataResult<Dataset> {
    let mut rdr = csv::Reader::from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let id_idx = headers
        .iter()
        .position(|h| h == id_column)
        .ok_or_else(|| DataError::MissingColumn {
            name: id_column.to_string(),
        })?;
    let tag_idx = headers
        .iter()
        .position(|h| h == tag_column)
        .ok_or_else(|| DataError::MissingColumn {
            name: tag_column.to_string(),
        })?;

    let numeric_headers: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != id_idx && *i != tag_idx)
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut user_ids = Vec::new();
    let mut tags = Vec::new();
    let mut columns: Vec<(String, Vec<f64>)> = numeric_headers
        .iter()
        .map(|(_, h)| (h.clone(), Vec::new()))
        .collect();

    for (row_no, result) in rdr.records().enumerate() {
        let line = row_no + 2; // 1-based, after the header
        let record = result?;
        if record.len() != headers.len() {
            return Err(DataError::RaggedRow {
                line,
                expected: headers.len(),
                got: record.len(),
            });
        }

        user_ids.push(record[id_idx].to_string());
        tags.push(record[tag_idx].parse::<RowTag>()?);

        for (slot, (field_idx, name)) in numeric_headers.iter().enumerate() {
            let field = &record[*field_idx];
            let value: f64 = field.parse().map_err(|_| DataError::BadNumber {
                line,
                column: name.clone(),
                value: field.to_string(),
            })?;
            columns[slot].1.push(value);
        }
    }

    Ok(Dataset {
        user_ids,
        tags,
        frame: Frame::from_columns(columns)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_read_dataset() {
        let f = write_temp(
            "user_primaryid,user_type,churn_status,plays\n\
             u1,train,1,10.5\n\
             u2,predict,0,3.0\n",
        );
        let ds = read_dataset(f.path(), "user_primaryid", "user_type").unwrap();
        assert_eq!(ds.user_ids, vec!["u1", "u2"]);
        assert_eq!(ds.tags, vec![RowTag::Train, RowTag::Predict]);
        assert_eq!(ds.frame.columns(), &["churn_status".to_string(), "plays".to_string()]);
        assert_eq!(ds.frame.column("plays").unwrap().data(), &[10.5, 3.0]);
    }

    #[test]
    fn test_unknown_tag_aborts() {
        let f = write_temp(
            "user_primaryid,user_type,plays\n\
             u1,holdout,10.5\n",
        );
        let err = read_dataset(f.path(), "user_primaryid", "user_type").unwrap_err();
        assert!(matches!(err, DataError::Frame(_)));
    }

    #[test]
    fn test_bad_number_reports_position() {
        let f = write_temp(
            "user_primaryid,user_type,plays\n\
             u1,train,ten\n",
        );
        let err = read_dataset(f.path(), "user_primaryid", "user_type").unwrap_err();
        match err {
            DataError::BadNumber { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "plays");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_tag_column() {
        let f = write_temp("user_primaryid,plays\nu1,10.5\n");
        let err = read_dataset(f.path(), "user_primaryid", "user_type").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }
}
