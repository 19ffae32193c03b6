use crate::error::{PreprocessError, PreprocessResult};
use churn_core::Tensor;

/// Map each column's empirical distribution to uniform [0, 1].
///
/// Fit learns `n_quantiles` per-column quantile boundaries from the training
/// partition; transform interpolates values between the learned boundaries
/// and clips anything beyond the observed training range to [0, 1]. No
/// refitting happens on transform, so routing the test and predict subsets
/// through the same instance keeps them on the training distribution.
pub struct QuantileTransformer {
    pub n_quantiles: usize,
    references: Vec<f64>,
    quantiles: Option<Vec<Vec<f64>>>,
}

impl QuantileTransformer {
    pub fn new(n_quantiles: usize) -> Self {
        let q = n_quantiles.max(2);
        let references = (0..q)
            .map(|i| i as f64 / (q - 1) as f64)
            .collect();
        QuantileTransformer {
            n_quantiles: q,
            references,
            quantiles: None,
        }
    }

    /// Learn per-column quantile boundaries from training data.
    pub fn fit(&mut self, x: &Tensor<f64>) -> PreprocessResult<()> {
        let rows = x.shape().dim(0)?;
        let cols = x.shape().dim(1)?;
        if rows == 0 {
            return Err(PreprocessError::SampleTooSmall { n: 0, min: 1 });
        }

        let mut quantiles = Vec::with_capacity(cols);
        for j in 0..cols {
            let mut sorted = x.col(j)?.into_data();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            let boundaries: Vec<f64> = self
                .references
                .iter()
                .map(|&p| empirical_quantile(&sorted, p))
                .collect();
            quantiles.push(boundaries);
        }
        self.quantiles = Some(quantiles);
        Ok(())
    }

    /// Transform values through the fitted quantile map, clipped to [0, 1].
    pub fn transform(&self, x: &Tensor<f64>) -> PreprocessResult<Tensor<f64>> {
        let quantiles = self
            .quantiles
            .as_ref()
            .expect("fit() must be called before transform()");
        let rows = x.shape().dim(0)?;
        let cols = x.shape().dim(1)?;

        let mut out = Vec::with_capacity(rows * cols);
        let src = x.data();
        for i in 0..rows {
            for j in 0..cols {
                out.push(map_to_uniform(src[i * cols + j], &quantiles[j], &self.references));
            }
        }
        Ok(Tensor::new(out, vec![rows, cols])?)
    }

    pub fn fit_transform(&mut self, x: &Tensor<f64>) -> PreprocessResult<Tensor<f64>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Linear-interpolated empirical quantile of a sorted sample.
fn empirical_quantile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = p * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Interpolate a value through the (quantile, reference) curve.
///
/// Plateaus of tied quantile boundaries map to the midpoint of their
/// reference span; values beyond the fitted range clip to 0 or 1.
fn map_to_uniform(v: f64, quantiles: &[f64], references: &[f64]) -> f64 {
    let last = quantiles.len() - 1;
    if v <= quantiles[0] {
        return 0.0;
    }
    if v >= quantiles[last] {
        return 1.0;
    }

    // First boundary >= v, and first boundary > v.
    let hi = quantiles.partition_point(|&q| q < v);
    let past = quantiles.partition_point(|&q| q <= v);

    if hi < past {
        // v sits exactly on a (possibly tied) boundary.
        return (references[hi] + references[past - 1]) / 2.0;
    }

    let (q_lo, q_hi) = (quantiles[hi - 1], quantiles[hi]);
    let (r_lo, r_hi) = (references[hi - 1], references[hi]);
    let frac = (v - q_lo) / (q_hi - q_lo);
    (r_lo + frac * (r_hi - r_lo)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_output_on_linear_data() {
        let values: Vec<Vec<f64>> = (0..101).map(|i| vec![i as f64]).collect();
        let x = Tensor::from_vec2d(&values).unwrap();

        let mut qt = QuantileTransformer::new(100);
        let out = qt.fit_transform(&x).unwrap();

        // Evenly spread input maps onto an evenly spread output.
        assert_relative_eq!(out.data()[0], 0.0);
        assert_relative_eq!(out.data()[100], 1.0);
        let mid = out.data()[50];
        assert!((mid - 0.5).abs() < 0.02, "midpoint mapped to {mid}");
    }

    #[test]
    fn test_out_of_range_values_clip() {
        let x = Tensor::from_vec2d(&[vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let mut qt = QuantileTransformer::new(100);
        qt.fit(&x).unwrap();

        let probe = Tensor::from_vec2d(&[vec![-10.0], vec![99.0]]).unwrap();
        let out = qt.transform(&probe).unwrap();
        assert_relative_eq!(out.data()[0], 0.0);
        assert_relative_eq!(out.data()[1], 1.0);
    }

    #[test]
    fn test_transform_is_pure() {
        let x = Tensor::rand(vec![500, 3], Some(9));
        let mut qt = QuantileTransformer::new(100);
        qt.fit(&x).unwrap();

        let a = qt.transform(&x).unwrap();
        let b = qt.transform(&x).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_monotone() {
        let x = Tensor::rand(vec![300, 1], Some(4));
        let mut qt = QuantileTransformer::new(100);
        qt.fit(&x).unwrap();

        let probe = Tensor::from_vec2d(&[vec![0.2], vec![0.4], vec![0.6], vec![0.8]]).unwrap();
        let out = qt.transform(&probe).unwrap();
        let d = out.data();
        assert!(d.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_output_bounded() {
        let x = Tensor::randn(vec![1000, 2], Some(11));
        let mut qt = QuantileTransformer::new(100);
        let out = qt.fit_transform(&x).unwrap();
        assert!(out.data().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
