//! Held-out evaluation: accuracy, ROC-AUC, confusion matrix and
//! CANCELED-class precision/recall/F1

use anyhow::{bail, Result};
use serde::Serialize;

/// Structured result of evaluating predictions on the held-out test set.
///
/// The confusion matrix is rows=actual, columns=predicted, class order
/// CANCELED (0) then FINISHED (1); its four cells always sum to the test
/// set size.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub roc_auc: f64,
    pub confusion: [[usize; 2]; 2],
    pub precision_canceled: f64,
    pub recall_canceled: f64,
    pub f1_canceled: f64,
}

/// Evaluate binary predictions. `prob_finished` is the predicted
/// probability of the positive (FINISHED=1) class per row.
pub fn evaluate(y_true: &[i32], y_pred: &[i32], prob_finished: &[f64]) -> Result<Evaluation> {
    if y_true.is_empty() {
        bail!("Cannot evaluate an empty test set");
    }
    if y_true.len() != y_pred.len() || y_true.len() != prob_finished.len() {
        bail!(
            "Length mismatch: {} labels, {} predictions, {} probabilities",
            y_true.len(),
            y_pred.len(),
            prob_finished.len()
        );
    }
    if y_true.iter().all(|&l| l == 0) || y_true.iter().all(|&l| l == 1) {
        bail!("Test set contains a single class; AUC and per-class metrics are undefined");
    }

    let mut confusion = [[0usize; 2]; 2];
    for (&actual, &predicted) in y_true.iter().zip(y_pred.iter()) {
        confusion[actual as usize][predicted as usize] += 1;
    }

    let correct = confusion[0][0] + confusion[1][1];
    let accuracy = correct as f64 / y_true.len() as f64;

    // CANCELED (label 0) is the class of interest
    let predicted_canceled = confusion[0][0] + confusion[1][0];
    let actual_canceled = confusion[0][0] + confusion[0][1];
    let precision_canceled = ratio(confusion[0][0], predicted_canceled);
    let recall_canceled = ratio(confusion[0][0], actual_canceled);
    let f1_canceled = if precision_canceled + recall_canceled > 0.0 {
        2.0 * precision_canceled * recall_canceled / (precision_canceled + recall_canceled)
    } else {
        0.0
    };

    Ok(Evaluation {
        accuracy,
        roc_auc: roc_auc(y_true, prob_finished),
        confusion,
        precision_canceled,
        recall_canceled,
        f1_canceled,
    })
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Rank-based ROC-AUC (the Mann-Whitney statistic), with tied scores
/// assigned their average rank.
fn roc_auc(y_true: &[i32], scores: &[f64]) -> f64 {
    let n = scores.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[a]
            .partial_cmp(&scores[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Average ranks across ties (1-based)
    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let average_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = average_rank;
        }
        i = j + 1;
    }

    let n_pos = y_true.iter().filter(|&&l| l == 1).count();
    let n_neg = n - n_pos;
    let positive_rank_sum: f64 = y_true
        .iter()
        .zip(ranks.iter())
        .filter(|(&l, _)| l == 1)
        .map(|(_, &r)| r)
        .sum();

    (positive_rank_sum - (n_pos * (n_pos + 1)) as f64 / 2.0) / (n_pos * n_neg) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_cells_sum_to_test_size() {
        let y_true = vec![0, 0, 1, 1, 1];
        let y_pred = vec![0, 1, 1, 1, 0];
        let probs = vec![0.1, 0.6, 0.9, 0.8, 0.4];
        let eval = evaluate(&y_true, &y_pred, &probs).unwrap();
        let total: usize = eval.confusion.iter().flatten().sum();
        assert_eq!(total, y_true.len());
    }

    #[test]
    fn test_perfect_separation_gives_auc_one() {
        let y_true = vec![0, 0, 1, 1];
        let probs = vec![0.1, 0.2, 0.8, 0.9];
        assert!((roc_auc(&y_true, &probs) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_scores_give_auc_zero() {
        let y_true = vec![0, 0, 1, 1];
        let probs = vec![0.9, 0.8, 0.2, 0.1];
        assert!(roc_auc(&y_true, &probs).abs() < 1e-12);
    }

    #[test]
    fn test_tied_scores_give_auc_half() {
        let y_true = vec![0, 1, 0, 1];
        let probs = vec![0.5, 0.5, 0.5, 0.5];
        assert!((roc_auc(&y_true, &probs) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_canceled_precision_and_recall() {
        // actual:    0 0 0 1 1
        // predicted: 0 1 0 0 1
        let y_true = vec![0, 0, 0, 1, 1];
        let y_pred = vec![0, 1, 0, 0, 1];
        let probs = vec![0.2, 0.7, 0.1, 0.4, 0.9];
        let eval = evaluate(&y_true, &y_pred, &probs).unwrap();
        assert!((eval.precision_canceled - 2.0 / 3.0).abs() < 1e-12);
        assert!((eval.recall_canceled - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_class_test_set_is_rejected() {
        let y_true = vec![1, 1, 1];
        let y_pred = vec![1, 1, 1];
        let probs = vec![0.9, 0.8, 0.7];
        assert!(evaluate(&y_true, &y_pred, &probs).is_err());
    }
}
