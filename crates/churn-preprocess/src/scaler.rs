use churn_core::error::TensorResult;
use churn_core::{Float, Tensor};

/// Standardize features by removing the mean and scaling to unit variance.
///
/// Fit only on the training partition; test and predict partitions are
/// transformed with the training statistics.
pub struct StandardScaler<T: Float> {
    pub mean: Option<Tensor<T>>,
    pub std: Option<Tensor<T>>,
}

impl<T: Float> StandardScaler<T> {
    pub fn new() -> Self {
        StandardScaler {
            mean: None,
            std: None,
        }
    }

    /// Compute mean and std from training data (2D: [samples, features]).
    pub fn fit(&mut self, x: &Tensor<T>) -> TensorResult<()> {
        self.mean = Some(x.mean_axis(0)?);
        self.std = Some(x.std_axis(0)?);
        Ok(())
    }

    /// Transform data using fitted mean and std.
    pub fn transform(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let mean = self.mean.as_ref().expect("fit() must be called before transform()");
        let std = self.std.as_ref().expect("fit() must be called before transform()");

        let mean_2d = mean.unsqueeze(0)?;
        let std_2d = std.unsqueeze(0)?;

        // (x - mean) / std
        let centered = x.sub(&mean_2d)?;
        // Add epsilon to avoid division by zero
        let std_safe = std_2d.apply(|v| if v.abs() < T::EPSILON { T::ONE } else { v });
        centered.div(&std_safe)
    }

    /// Fit and transform in one step.
    pub fn fit_transform(&mut self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        self.fit(x)?;
        self.transform(x)
    }
}

impl<T: Float> Default for StandardScaler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
        ]).unwrap();

        let mut scaler = StandardScaler::new();
        let transformed = scaler.fit_transform(&x).unwrap();

        // Mean should be ~0
        let mean = transformed.mean_axis(0).unwrap();
        assert!(mean.data()[0].abs() < 1e-10);
        assert!(mean.data()[1].abs() < 1e-10);
    }

    #[test]
    fn test_transform_uses_training_statistics() {
        let train: Tensor<f64> = Tensor::from_vec2d(&[
            vec![0.0],
            vec![2.0],
        ]).unwrap();
        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();

        // mean = 1, std = 1
        let test: Tensor<f64> = Tensor::from_vec2d(&[vec![4.0]]).unwrap();
        let out = scaler.transform(&test).unwrap();
        assert!((out.data()[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_column_is_guarded() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![5.0],
            vec![5.0],
        ]).unwrap();
        let mut scaler = StandardScaler::new();
        let out = scaler.fit_transform(&x).unwrap();
        assert!(out.data().iter().all(|v| v.is_finite()));
    }
}
