//! Stratified k-fold cross-validation for diagnostic accuracy estimates

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::BTreeMap;

use super::naive_bayes::GaussianNb;

/// Per-fold accuracy of a freshly fit classifier, reported in fold-index
/// order regardless of which fold finishes first.
///
/// Diagnostic only: the final model is always refit on the full set by the
/// caller, never selected from these folds.
pub fn stratified_cv_accuracy(
    x: &[Vec<f64>],
    y: &[i32],
    folds: usize,
    seed: u64,
) -> Result<Vec<f64>> {
    if folds < 2 {
        bail!("cross-validation needs at least 2 folds, got {}", folds);
    }

    let assignments = fold_assignments(y, folds, seed)?;

    (0..folds)
        .into_par_iter()
        .map(|fold| {
            let mut train_x = Vec::new();
            let mut train_y = Vec::new();
            let mut test_x = Vec::new();
            let mut test_y = Vec::new();
            for (i, &assigned) in assignments.iter().enumerate() {
                if assigned == fold {
                    test_x.push(x[i].clone());
                    test_y.push(y[i]);
                } else {
                    train_x.push(x[i].clone());
                    train_y.push(y[i]);
                }
            }

            let model = GaussianNb::fit(&train_x, &train_y)?;
            let predictions = model.predict(&test_x);
            let correct = predictions
                .iter()
                .zip(test_y.iter())
                .filter(|(p, t)| p == t)
                .count();
            Ok(correct as f64 / test_y.len() as f64)
        })
        .collect()
}

/// Mean and population standard deviation of fold scores.
pub fn score_summary(scores: &[f64]) -> (f64, f64) {
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let var = scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Assign each sample to a fold, stratified: every class is shuffled and
/// dealt round-robin so each fold carries roughly the class proportions of
/// the whole set.
fn fold_assignments(y: &[i32], folds: usize, seed: u64) -> Result<Vec<usize>> {
    let mut by_class: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in y.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    for (label, indices) in &by_class {
        if indices.len() < folds {
            bail!(
                "Class {} has {} sample(s), fewer than the {} requested folds",
                label,
                indices.len(),
                folds
            );
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut assignments = vec![0usize; y.len()];
    for (_, mut indices) in by_class {
        indices.shuffle(&mut rng);
        for (position, idx) in indices.into_iter().enumerate() {
            assignments[idx] = position % folds;
        }
    }
    Ok(assignments)
}
