use churn_core::{Float, Tensor};

/// Recall for a specific class.
pub fn recall_class<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>, class: usize) -> f64 {
    let n = y_true.numel();
    let mut tp = 0usize;
    let mut fn_ = 0usize;
    for i in 0..n {
        let t = y_true.data()[i].to_f64().round() as usize;
        let p = y_pred.data()[i].to_f64().round() as usize;
        if t == class {
            if p == class {
                tp += 1;
            } else {
                fn_ += 1;
            }
        }
    }
    if tp + fn_ == 0 {
        0.0
    } else {
        tp as f64 / (tp + fn_) as f64
    }
}

/// Recall of the positive class (1).
pub fn recall<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> f64 {
    recall_class(y_true, y_pred, 1)
}

/// Balanced accuracy: mean of per-class recalls.
///
/// Robust to class imbalance where plain accuracy is not.
pub fn balanced_accuracy<T: Float>(y_true: &Tensor<T>, y_pred: &Tensor<T>) -> f64 {
    (recall_class(y_true, y_pred, 0) + recall_class(y_true, y_pred, 1)) / 2.0
}

/// ROC-AUC for binary classification.
///
/// Computes the Area Under the Receiver Operating Characteristic Curve
/// using the trapezoidal rule over all thresholds.
pub fn roc_auc<T: Float>(y_true: &Tensor<T>, y_scores: &Tensor<T>) -> f64 {
    let n = y_true.numel();
    // Create (score, label) pairs and sort by score descending
    let mut pairs: Vec<(f64, f64)> = y_scores
        .data()
        .iter()
        .zip(y_true.data().iter())
        .map(|(&s, &t)| (s.to_f64(), t.to_f64().round()))
        .collect();
    pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let total_pos = pairs.iter().filter(|(_, t)| *t > 0.5).count() as f64;
    let total_neg = n as f64 - total_pos;

    if total_pos == 0.0 || total_neg == 0.0 {
        return 0.5; // undefined, return random
    }

    let mut auc = 0.0;
    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut prev_tpr = 0.0;
    let mut prev_fpr = 0.0;

    for (_, label) in &pairs {
        if *label > 0.5 {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let tpr = tp / total_pos;
        let fpr = fp / total_neg;
        auc += (fpr - prev_fpr) * (tpr + prev_tpr) / 2.0; // trapezoidal rule
        prev_tpr = tpr;
        prev_fpr = fpr;
    }
    auc
}
