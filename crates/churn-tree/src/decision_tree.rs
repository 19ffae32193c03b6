use churn_core::error::TensorResult;
use churn_core::{Float, Tensor};
use rayon::prelude::*;

/// A node in the decision tree.
#[derive(Debug, Clone)]
enum TreeNode<T: Float> {
    /// Internal node: splits on feature `feature_idx` at `threshold`.
    Split {
        feature_idx: usize,
        threshold: T,
        left: Box<TreeNode<T>>,
        right: Box<TreeNode<T>>,
    },
    /// Leaf: predicts the mean target of its samples.
    Leaf { value: T },
}

struct Candidate<T: Float> {
    feature_idx: usize,
    threshold: T,
    score: f64,
}

/// Decision Tree Regressor (CART, variance reduction).
///
/// The split search sorts each feature once per node and sweeps prefix
/// sums over the sorted targets, evaluating every distinct threshold in a
/// single pass. Features are searched in parallel.
pub struct DecisionTreeRegressor<T: Float> {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    tree: Option<TreeNode<T>>,
}

impl<T: Float> DecisionTreeRegressor<T> {
    pub fn new(max_depth: usize, min_samples_split: usize, min_samples_leaf: usize) -> Self {
        DecisionTreeRegressor {
            max_depth: if max_depth == 0 { 3 } else { max_depth },
            min_samples_split: if min_samples_split == 0 { 2 } else { min_samples_split },
            min_samples_leaf: if min_samples_leaf == 0 { 1 } else { min_samples_leaf },
            tree: None,
        }
    }

    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<()> {
        let n = x.shape().dim(0)?;
        let p = x.shape().dim(1)?;

        let indices: Vec<usize> = (0..n).collect();
        self.tree = Some(self.build_tree(x, y, &indices, p, 0));
        Ok(())
    }

    fn build_tree(
        &self,
        x: &Tensor<T>,
        y: &Tensor<T>,
        indices: &[usize],
        n_features: usize,
        depth: usize,
    ) -> TreeNode<T> {
        if depth >= self.max_depth
            || indices.len() < self.min_samples_split
            || indices.len() < 2 * self.min_samples_leaf
        {
            return TreeNode::Leaf {
                value: mean_target(y, indices),
            };
        }

        let best = (0..n_features)
            .into_par_iter()
            .filter_map(|feature_idx| self.best_split_for_feature(x, y, indices, feature_idx))
            .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal));

        let Some(best) = best else {
            // No feature offers a valid split (constant features or targets).
            return TreeNode::Leaf {
                value: mean_target(y, indices),
            };
        };

        let width = x.shape().dims()[1];
        let mut left = Vec::new();
        let mut right = Vec::new();
        for &i in indices {
            if x.data()[i * width + best.feature_idx] <= best.threshold {
                left.push(i);
            } else {
                right.push(i);
            }
        }

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left: Box::new(self.build_tree(x, y, &left, n_features, depth + 1)),
            right: Box::new(self.build_tree(x, y, &right, n_features, depth + 1)),
        }
    }

    /// Best threshold for one feature by residual sum of squares, or None
    /// if the feature is constant over the node.
    fn best_split_for_feature(
        &self,
        x: &Tensor<T>,
        y: &Tensor<T>,
        indices: &[usize],
        feature_idx: usize,
    ) -> Option<Candidate<T>> {
        let width = x.shape().dims()[1];
        let n = indices.len();

        let mut pairs: Vec<(T, f64)> = indices
            .iter()
            .map(|&i| (x.data()[i * width + feature_idx], y.data()[i].to_f64()))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let total: f64 = pairs.iter().map(|&(_, t)| t).sum();

        let mut best: Option<Candidate<T>> = None;
        let mut left_sum = 0.0;
        for split in 1..n {
            left_sum += pairs[split - 1].1;
            if pairs[split].0 <= pairs[split - 1].0 {
                continue; // tied values cannot be separated
            }
            if split < self.min_samples_leaf || n - split < self.min_samples_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let nl = split as f64;
            let nr = (n - split) as f64;
            // Minimizing RSS is equivalent to maximizing this term; negate
            // so the best candidate is the minimum score.
            let score = -(left_sum * left_sum / nl + right_sum * right_sum / nr);

            if best.as_ref().map_or(true, |b| score < b.score) {
                best = Some(Candidate {
                    feature_idx,
                    threshold: (pairs[split - 1].0 + pairs[split].0) / T::TWO,
                    score,
                });
            }
        }
        best
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let tree = self.tree.as_ref().expect("fit() must be called before predict()");
        let n = x.shape().dim(0)?;
        let width = x.shape().dim(1)?;

        let predictions: Vec<T> = (0..n)
            .map(|i| {
                let row = &x.data()[i * width..(i + 1) * width];
                let mut node = tree;
                loop {
                    match node {
                        TreeNode::Leaf { value } => break *value,
                        TreeNode::Split {
                            feature_idx,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if row[*feature_idx] <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect();

        Tensor::new(predictions, vec![n])
    }
}

fn mean_target<T: Float>(y: &Tensor<T>, indices: &[usize]) -> T {
    if indices.is_empty() {
        return T::ZERO;
    }
    let sum: f64 = indices.iter().map(|&i| y.data()[i].to_f64()).sum();
    T::from_f64(sum / indices.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_a_step_function() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0], vec![2.0], vec![3.0], vec![4.0],
            vec![10.0], vec![11.0], vec![12.0], vec![13.0],
        ]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[0.0, 0.0, 0.0, 0.0, 5.0, 5.0, 5.0, 5.0]);

        let mut tree = DecisionTreeRegressor::new(3, 2, 1);
        tree.fit(&x, &y).unwrap();

        let pred = tree.predict(&x).unwrap();
        for i in 0..8 {
            assert!((pred.data()[i] - y.data()[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_target_yields_leaf() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[7.0, 7.0, 7.0]);

        let mut tree = DecisionTreeRegressor::new(3, 2, 1);
        tree.fit(&x, &y).unwrap();

        let pred = tree.predict(&x).unwrap();
        assert!(pred.data().iter().all(|&v| (v - 7.0).abs() < 1e-9));
    }

    #[test]
    fn test_depth_limit_respected() {
        // Depth 1 gives a single split: two distinct leaf values at most.
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0], vec![2.0], vec![3.0], vec![4.0],
        ]).unwrap();
        let y: Tensor<f64> = Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0]);

        let mut tree = DecisionTreeRegressor::new(1, 2, 1);
        tree.fit(&x, &y).unwrap();

        let pred = tree.predict(&x).unwrap();
        let mut distinct: Vec<f64> = pred.data().to_vec();
        distinct.sort_by(|a, b| a.partial_cmp(b).unwrap());
        distinct.dedup();
        assert!(distinct.len() <= 2);
    }
}
