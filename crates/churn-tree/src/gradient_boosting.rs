use churn_core::error::TensorResult;
use churn_core::{Float, Tensor};

use crate::decision_tree::DecisionTreeRegressor;

/// Gradient Boosted Trees for Binary Classification.
///
/// Uses log-loss (binary cross-entropy) as the objective.
/// Predictions are log-odds, converted with sigmoid.
pub struct GradientBoostingClassifier<T: Float> {
    pub n_estimators: usize,
    pub learning_rate: T,
    pub max_depth: usize,
    pub min_samples_split: usize,
    trees: Vec<DecisionTreeRegressor<T>>,
    initial_log_odds: T,
}

impl<T: Float> GradientBoostingClassifier<T> {
    pub fn new(
        n_estimators: usize,
        learning_rate: T,
        max_depth: usize,
        min_samples_split: usize,
    ) -> Self {
        GradientBoostingClassifier {
            n_estimators,
            learning_rate,
            max_depth: if max_depth == 0 { 3 } else { max_depth },
            min_samples_split: if min_samples_split == 0 { 2 } else { min_samples_split },
            trees: Vec::new(),
            initial_log_odds: T::ZERO,
        }
    }

    fn sigmoid(x: T) -> T {
        T::ONE / (T::ONE + (-x).exp())
    }

    pub fn fit(&mut self, x: &Tensor<T>, y: &Tensor<T>) -> TensorResult<()> {
        let n = x.shape().dim(0)?;

        // Initial log-odds based on class proportions
        let pos_count: f64 = y.data().iter().map(|v| v.to_f64()).sum();
        let neg_count = n as f64 - pos_count;
        self.initial_log_odds = if neg_count > 0.0 {
            T::from_f64((pos_count / neg_count).max(1e-10).ln())
        } else {
            T::ZERO
        };

        let mut raw_predictions = vec![self.initial_log_odds; n];
        self.trees.clear();

        for _iter in 0..self.n_estimators {
            // Pseudo-residuals: y - sigmoid(raw_prediction)
            let residuals: Vec<T> = y
                .data()
                .iter()
                .zip(raw_predictions.iter())
                .map(|(&yi, &ri)| yi - Self::sigmoid(ri))
                .collect();
            let residual_tensor = Tensor::new(residuals, vec![n])?;

            let mut tree = DecisionTreeRegressor::new(self.max_depth, self.min_samples_split, 1);
            tree.fit(x, &residual_tensor)?;

            let tree_pred = tree.predict(x)?;
            for i in 0..n {
                raw_predictions[i] = raw_predictions[i] + self.learning_rate * tree_pred.data()[i];
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    pub fn predict_proba(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let n = x.shape().dim(0)?;
        let mut raw_predictions = vec![self.initial_log_odds; n];

        for tree in &self.trees {
            let tree_pred = tree.predict(x)?;
            for i in 0..n {
                raw_predictions[i] = raw_predictions[i] + self.learning_rate * tree_pred.data()[i];
            }
        }

        let probas: Vec<T> = raw_predictions.iter().map(|&r| Self::sigmoid(r)).collect();
        Tensor::new(probas, vec![n])
    }

    pub fn predict(&self, x: &Tensor<T>) -> TensorResult<Tensor<T>> {
        let probas = self.predict_proba(x)?;
        let preds: Vec<T> = probas
            .data()
            .iter()
            .map(|&p| if p >= T::HALF { T::ONE } else { T::ZERO })
            .collect();
        Tensor::new(preds, vec![x.shape().dim(0)?])
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
