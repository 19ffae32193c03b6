use crate::error::{SamplingError, SamplingResult};
use crate::knn::k_nearest;
use churn_core::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Synthetic minority over-sampling.
///
/// Generates new minority samples on segments between each picked minority
/// sample and one of its `k_neighbors` nearest minority neighbours, until
/// the class counts are equal. Deterministic under a fixed seed.
pub struct Smote {
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Smote { k_neighbors, seed }
    }

    pub fn fit_resample(
        &self,
        x: &Tensor<f64>,
        y: &Tensor<f64>,
    ) -> SamplingResult<(Tensor<f64>, Tensor<f64>)> {
        let n = x.shape().dim(0)?;
        let width = x.shape().dim(1)?;
        let (minority_label, minority, majority) = class_partition(y, n)?;

        let need = majority.len() - minority.len();
        if need == 0 {
            return Ok((x.clone(), y.clone()));
        }
        if minority.len() < 2 {
            return Err(SamplingError::TooFewMinority {
                count: minority.len(),
            });
        }

        // Dense copy of the minority rows for neighbour search.
        let minority_rows: Vec<f64> = minority
            .iter()
            .flat_map(|&i| x.data()[i * width..(i + 1) * width].iter().copied())
            .collect();
        let k = self.k_neighbors.min(minority.len() - 1);

        let neighbours: Vec<Vec<usize>> = (0..minority.len())
            .map(|i| {
                k_nearest(
                    &minority_rows,
                    width,
                    minority.len(),
                    &minority_rows[i * width..(i + 1) * width],
                    Some(i),
                    k,
                )
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out_x = x.data().to_vec();
        let mut out_y = y.data().to_vec();
        out_x.reserve(need * width);
        out_y.reserve(need);

        for _ in 0..need {
            let base = rng.gen_range(0..minority.len());
            let neighbour = neighbours[base][rng.gen_range(0..k)];
            let gap: f64 = rng.gen();

            let b = &minority_rows[base * width..(base + 1) * width];
            let nb = &minority_rows[neighbour * width..(neighbour + 1) * width];
            for d in 0..width {
                out_x.push(b[d] + gap * (nb[d] - b[d]));
            }
            out_y.push(minority_label);
        }

        let rows = n + need;
        Ok((
            Tensor::new(out_x, vec![rows, width])?,
            Tensor::new(out_y, vec![rows])?,
        ))
    }
}

/// Split row indices by binary label; returns (minority label, minority
/// indices, majority indices).
pub(crate) fn class_partition(
    y: &Tensor<f64>,
    n: usize,
) -> SamplingResult<(f64, Vec<usize>, Vec<usize>)> {
    let mut labels: Vec<f64> = y.data().iter().map(|v| v.round()).collect();
    let mut distinct = labels.clone();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();
    match distinct.len() {
        0 | 1 => return Err(SamplingError::SingleClass),
        2 => {}
        k => return Err(SamplingError::NotBinary { labels: k }),
    }

    labels.truncate(n);
    let (a, b) = (distinct[0], distinct[1]);
    let a_rows: Vec<usize> = (0..n).filter(|&i| labels[i] == a).collect();
    let b_rows: Vec<usize> = (0..n).filter(|&i| labels[i] == b).collect();
    if a_rows.len() <= b_rows.len() {
        Ok((a, a_rows, b_rows))
    } else {
        Ok((b, b_rows, a_rows))
    }
}
