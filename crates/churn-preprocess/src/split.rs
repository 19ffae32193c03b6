use crate::error::{PreprocessError, PreprocessResult};
use churn_core::Tensor;
use churn_frame::{Frame, RowTag};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Result of partitioning the tagged table into its two destinations.
///
/// `train_rows` / `predict_rows` are the original row indices of each
/// partition, so side tables (user ids, engagement columns) can be aligned
/// without assuming anything about row order downstream.
#[derive(Debug, Clone)]
pub struct TagSplit {
    pub train_x: Frame,
    pub train_y: Tensor<f64>,
    pub predict_x: Frame,
    pub predict_y: Tensor<f64>,
    pub train_rows: Vec<usize>,
    pub predict_rows: Vec<usize>,
}

/// Partition rows by tag and separate the label column from the features.
///
/// This is a partition, not a sample: every row lands in exactly one subset
/// and row alignment within each subset is preserved. The label column is
/// removed from both feature frames. An empty partition is an error — a run
/// with nothing to train on or nothing to score is misconfigured.
pub fn split_by_tag(
    frame: &Frame,
    label_column: &str,
    tags: &[RowTag],
) -> PreprocessResult<TagSplit> {
    if tags.len() != frame.n_rows() {
        return Err(PreprocessError::LengthMismatch {
            x: frame.n_rows(),
            y: tags.len(),
        });
    }

    let mut train_rows = Vec::new();
    let mut predict_rows = Vec::new();
    for (i, tag) in tags.iter().enumerate() {
        match tag {
            RowTag::Train => train_rows.push(i),
            RowTag::Predict => predict_rows.push(i),
        }
    }
    for (rows, tag) in [(&train_rows, RowTag::Train), (&predict_rows, RowTag::Predict)] {
        if rows.is_empty() {
            return Err(PreprocessError::EmptyPartition {
                tag: tag.as_str().to_string(),
            });
        }
    }

    let labels = frame.column(label_column)?;
    let features = frame.drop_column(label_column)?;

    Ok(TagSplit {
        train_x: features.take_rows(&train_rows)?,
        train_y: labels.take_rows(&train_rows)?,
        predict_x: features.take_rows(&predict_rows)?,
        predict_y: labels.take_rows(&predict_rows)?,
        train_rows,
        predict_rows,
    })
}

/// Split data into training and test sets.
///
/// Returns `(X_train, X_test, y_train, y_test)`. Deterministic under a fixed
/// seed.
pub fn train_test_split(
    x: &Tensor<f64>,
    y: &Tensor<f64>,
    test_ratio: f64,
    seed: Option<u64>,
) -> PreprocessResult<(Tensor<f64>, Tensor<f64>, Tensor<f64>, Tensor<f64>)> {
    let n = x.shape().dim(0)?;
    if n != y.numel() {
        return Err(PreprocessError::LengthMismatch { x: n, y: y.numel() });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let test_size = (n as f64 * test_ratio).round() as usize;
    let train_size = n - test_size;

    let x_train = x.take_rows(&indices[..train_size])?;
    let x_test = x.take_rows(&indices[train_size..])?;
    let y_train = y.take_rows(&indices[..train_size])?;
    let y_test = y.take_rows(&indices[train_size..])?;

    Ok((x_train, x_test, y_train, y_test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_frame() -> (Frame, Vec<RowTag>) {
        let frame = Frame::from_columns(vec![
            ("churn_status".to_string(), vec![1.0, 0.0, 0.0, 1.0, 0.0]),
            ("plays".to_string(), vec![5.0, 6.0, 7.0, 8.0, 9.0]),
            ("actions".to_string(), vec![50.0, 60.0, 70.0, 80.0, 90.0]),
        ])
        .unwrap();
        let tags = vec![
            RowTag::Train,
            RowTag::Predict,
            RowTag::Train,
            RowTag::Train,
            RowTag::Predict,
        ];
        (frame, tags)
    }

    #[test]
    fn test_split_is_a_partition() {
        let (frame, tags) = tagged_frame();
        let split = split_by_tag(&frame, "churn_status", &tags).unwrap();

        assert_eq!(split.train_x.n_rows() + split.predict_x.n_rows(), frame.n_rows());
        // Disjoint by row identity
        for i in &split.train_rows {
            assert!(!split.predict_rows.contains(i));
        }
    }

    #[test]
    fn test_label_column_removed_and_aligned() {
        let (frame, tags) = tagged_frame();
        let split = split_by_tag(&frame, "churn_status", &tags).unwrap();

        assert!(split.train_x.column_index("churn_status").is_err());
        assert_eq!(split.train_y.data(), &[1.0, 0.0, 1.0]);
        assert_eq!(split.train_x.column("plays").unwrap().data(), &[5.0, 7.0, 8.0]);
        assert_eq!(split.predict_x.column("plays").unwrap().data(), &[6.0, 9.0]);
    }

    #[test]
    fn test_empty_partition_is_an_error() {
        let frame = Frame::from_columns(vec![
            ("churn_status".to_string(), vec![1.0, 0.0]),
            ("plays".to_string(), vec![5.0, 6.0]),
        ])
        .unwrap();
        let tags = vec![RowTag::Train, RowTag::Train];
        let err = split_by_tag(&frame, "churn_status", &tags).unwrap_err();
        assert!(matches!(err, PreprocessError::EmptyPartition { .. }));
    }

    #[test]
    fn test_train_test_split_sizes() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
            vec![7.0, 8.0],
            vec![9.0, 10.0],
        ])
        .unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[0.0, 1.0, 0.0, 1.0, 0.0]);

        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, 0.4, Some(42)).unwrap();

        assert_eq!(x_train.shape().dim(0).unwrap(), 3);
        assert_eq!(x_test.shape().dim(0).unwrap(), 2);
        assert_eq!(y_train.numel(), 3);
        assert_eq!(y_test.numel(), 2);
    }

    #[test]
    fn test_train_test_split_deterministic() {
        let x: Tensor<f64> = Tensor::rand(vec![50, 3], Some(1));
        let y: Tensor<f64> = Tensor::rand(vec![50], Some(2));
        let (a, _, _, _) = train_test_split(&x, &y, 0.2, Some(0)).unwrap();
        let (b, _, _, _) = train_test_split(&x, &y, 0.2, Some(0)).unwrap();
        assert_eq!(a.data(), b.data());
    }
}
