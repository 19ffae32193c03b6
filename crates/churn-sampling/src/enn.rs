use crate::error::{SamplingError, SamplingResult};
use crate::knn::k_nearest;
use crate::smote::class_partition;
use churn_core::Tensor;
use rayon::prelude::*;

/// Edited-nearest-neighbour cleaning.
///
/// Removes any sample (of either class) whose `n_neighbors` nearest
/// neighbours do not all share its label — a cleaning pass that strips
/// ambiguous points near the decision boundary after over-sampling.
pub struct EditedNearestNeighbours {
    pub n_neighbors: usize,
}

impl EditedNearestNeighbours {
    pub fn new(n_neighbors: usize) -> Self {
        EditedNearestNeighbours { n_neighbors }
    }

    pub fn fit_resample(
        &self,
        x: &Tensor<f64>,
        y: &Tensor<f64>,
    ) -> SamplingResult<(Tensor<f64>, Tensor<f64>)> {
        let n = x.shape().dim(0)?;
        let width = x.shape().dim(1)?;
        class_partition(y, n)?;

        let labels: Vec<f64> = y.data().iter().map(|v| v.round()).collect();
        let rows = x.data();
        let k = self.n_neighbors.min(n - 1);

        let keep: Vec<usize> = (0..n)
            .into_par_iter()
            .filter(|&i| {
                let query = &rows[i * width..(i + 1) * width];
                k_nearest(rows, width, n, query, Some(i), k)
                    .into_iter()
                    .all(|j| labels[j] == labels[i])
            })
            .collect();

        // Cleaning must not eliminate a class outright.
        for label in [0.0, 1.0] {
            if labels.iter().any(|&l| l == label)
                && !keep.iter().any(|&i| labels[i] == label)
            {
                return Err(SamplingError::ClassEliminated {
                    label: label as u8,
                });
            }
        }

        Ok((x.take_rows(&keep)?, y.take_rows(&keep)?))
    }
}
