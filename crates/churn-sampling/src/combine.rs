use crate::enn::EditedNearestNeighbours;
use crate::error::SamplingResult;
use crate::smote::Smote;
use churn_core::Tensor;

/// Combined over/under-sampling: SMOTE to equalise class counts, then an
/// edited-nearest-neighbour pass to strip the ambiguous samples the
/// interpolation (and the original data) left near the class boundary.
///
/// The output has new row identity — no input row index survives resampling.
pub struct SmoteEnn {
    pub seed: u64,
    pub smote_neighbors: usize,
    pub enn_neighbors: usize,
}

impl SmoteEnn {
    pub fn new(seed: u64) -> Self {
        SmoteEnn {
            seed,
            smote_neighbors: 5,
            enn_neighbors: 3,
        }
    }

    pub fn fit_resample(
        &self,
        x: &Tensor<f64>,
        y: &Tensor<f64>,
    ) -> SamplingResult<(Tensor<f64>, Tensor<f64>)> {
        let smote = Smote::new(self.smote_neighbors, self.seed);
        let (over_x, over_y) = smote.fit_resample(x, y)?;

        let enn = EditedNearestNeighbours::new(self.enn_neighbors);
        enn.fit_resample(&over_x, &over_y)
    }
}
