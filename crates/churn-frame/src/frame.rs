use crate::error::{FrameError, FrameResult};
use churn_core::Tensor;
use std::collections::HashSet;

/// A named-column matrix: the unit of data flowing between pipeline stages.
///
/// Columns are ordered; all values are `f64`. Row order is the row identity —
/// stages that subset rows must do so through [`Frame::take_rows`] so the
/// alignment with any side tables (ids, tags, labels) is explicit.
#[derive(Debug, Clone)]
pub struct Frame {
    columns: Vec<String>,
    data: Tensor<f64>,
}

impl Frame {
    /// Build a frame from column names and a `[rows, columns]` tensor.
    pub fn new(columns: Vec<String>, data: Tensor<f64>) -> FrameResult<Self> {
        let cols = data.shape().dim(1)?;
        if columns.len() != cols {
            return Err(FrameError::ColumnCountMismatch {
                names: columns.len(),
                cols,
            });
        }
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(FrameError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(Frame { columns, data })
    }

    /// Build a frame from `(name, values)` pairs of equal length.
    pub fn from_columns(columns: Vec<(String, Vec<f64>)>) -> FrameResult<Self> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        let n_cols = columns.len();
        for (_, values) in &columns {
            if values.len() != n_rows {
                return Err(FrameError::RowCountMismatch {
                    expected: n_rows,
                    got: values.len(),
                });
            }
        }
        let mut data = vec![0.0; n_rows * n_cols];
        for (j, (_, values)) in columns.iter().enumerate() {
            for (i, &v) in values.iter().enumerate() {
                data[i * n_cols + j] = v;
            }
        }
        let names = columns.into_iter().map(|(n, _)| n).collect();
        Frame::new(names, Tensor::new(data, vec![n_rows, n_cols])?)
    }

    pub fn n_rows(&self) -> usize {
        self.data.shape().dim(0).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &Tensor<f64> {
        &self.data
    }

    pub fn into_data(self) -> Tensor<f64> {
        self.data
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> FrameResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| FrameError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Copy of a single column as a 1-D tensor.
    pub fn column(&self, name: &str) -> FrameResult<Tensor<f64>> {
        let j = self.column_index(name)?;
        Ok(self.data.col(j)?)
    }

    /// Project onto a subset of columns, in the given order.
    pub fn select(&self, names: &[&str]) -> FrameResult<Frame> {
        let indices: Vec<usize> = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<FrameResult<_>>()?;

        let n_rows = self.n_rows();
        let n_cols = indices.len();
        let src = self.data.data();
        let width = self.n_cols();

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            for &j in &indices {
                data.push(src[i * width + j]);
            }
        }
        Frame::new(
            names.iter().map(|n| n.to_string()).collect(),
            Tensor::new(data, vec![n_rows, n_cols])?,
        )
    }

    /// Drop a single column, keeping the order of the rest.
    pub fn drop_column(&self, name: &str) -> FrameResult<Frame> {
        self.column_index(name)?;
        let kept: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| c.as_str() != name)
            .map(|c| c.as_str())
            .collect();
        self.select(&kept)
    }

    /// Gather rows by index list, preserving index order.
    pub fn take_rows(&self, indices: &[usize]) -> FrameResult<Frame> {
        Ok(Frame {
            columns: self.columns.clone(),
            data: self.data.take_rows(indices)?,
        })
    }

    /// Rewrite one column in place through a pure function.
    pub fn map_column<F: Fn(f64) -> f64>(&mut self, name: &str, f: F) -> FrameResult<()> {
        let j = self.column_index(name)?;
        let width = self.n_cols();
        for row in self.data.data_mut().chunks_mut(width) {
            row[j] = f(row[j]);
        }
        Ok(())
    }

    /// Concatenate frames column-wise. Row counts must agree and column
    /// names must stay unique across parts.
    pub fn hstack(parts: &[&Frame]) -> FrameResult<Frame> {
        let tensors: Vec<&Tensor<f64>> = parts.iter().map(|f| &f.data).collect();
        let data = Tensor::concatenate(&tensors, 1)?;
        let columns: Vec<String> = parts
            .iter()
            .flat_map(|f| f.columns.iter().cloned())
            .collect();
        Frame::new(columns, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::from_columns(vec![
            ("a".to_string(), vec![1.0, 2.0, 3.0]),
            ("b".to_string(), vec![10.0, 20.0, 30.0]),
            ("c".to_string(), vec![100.0, 200.0, 300.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_columns_layout() {
        let f = sample();
        assert_eq!(f.n_rows(), 3);
        assert_eq!(f.n_cols(), 3);
        assert_eq!(f.data().get(&[1, 2]).unwrap(), 200.0);
        assert_eq!(f.column("b").unwrap().data(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_select_reorders() {
        let f = sample();
        let g = f.select(&["c", "a"]).unwrap();
        assert_eq!(g.columns(), &["c".to_string(), "a".to_string()]);
        assert_eq!(g.data().data(), &[100.0, 1.0, 200.0, 2.0, 300.0, 3.0]);
    }

    #[test]
    fn test_select_missing_column() {
        let f = sample();
        assert!(matches!(
            f.select(&["a", "z"]),
            Err(FrameError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_drop_column() {
        let f = sample();
        let g = f.drop_column("b").unwrap();
        assert_eq!(g.columns(), &["a".to_string(), "c".to_string()]);
        assert_eq!(g.n_rows(), 3);
    }

    #[test]
    fn test_take_rows_alignment() {
        let f = sample();
        let g = f.take_rows(&[2, 0]).unwrap();
        assert_eq!(g.column("a").unwrap().data(), &[3.0, 1.0]);
        assert_eq!(g.column("c").unwrap().data(), &[300.0, 100.0]);
    }

    #[test]
    fn test_map_column() {
        let mut f = sample();
        f.map_column("a", |v| v * 2.0).unwrap();
        assert_eq!(f.column("a").unwrap().data(), &[2.0, 4.0, 6.0]);
        // Other columns untouched
        assert_eq!(f.column("b").unwrap().data(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_hstack() {
        let f = sample();
        let g = Frame::from_columns(vec![("d".to_string(), vec![7.0, 8.0, 9.0])]).unwrap();
        let h = Frame::hstack(&[&f, &g]).unwrap();
        assert_eq!(h.n_cols(), 4);
        assert_eq!(h.column("d").unwrap().data(), &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_hstack_duplicate_names() {
        let f = sample();
        assert!(matches!(
            Frame::hstack(&[&f, &f]),
            Err(FrameError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let r = Frame::from_columns(vec![
            ("a".to_string(), vec![1.0]),
            ("a".to_string(), vec![2.0]),
        ]);
        assert!(matches!(r, Err(FrameError::DuplicateColumn { .. })));
    }
}
