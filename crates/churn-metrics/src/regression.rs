use churn_core::{Float, Tensor};

/// Mean Squared Error.
pub fn mse<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> f64 {
    assert_eq!(y_true.numel(), y_pred.numel());
    let n = y_true.numel();
    let sum: f64 = y_true
        .data()
        .iter()
        .zip(y_pred.data().iter())
        .map(|(&t, &p)| {
            let d = (t - p).to_f64();
            d * d
        })
        .sum();
    sum / n as f64
}
