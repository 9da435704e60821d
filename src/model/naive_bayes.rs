//! Gaussian naive Bayes classifier
//!
//! Assumes each feature is conditionally independent given the class, with
//! a per-class Gaussian per feature. Variances are smoothed by a fraction of
//! the largest overall feature variance to keep degenerate (constant)
//! features from producing infinite likelihoods.

use anyhow::{bail, Result};

const VAR_SMOOTHING: f64 = 1e-9;

/// A fitted Gaussian naive Bayes model.
#[derive(Debug, Clone)]
pub struct GaussianNb {
    classes: Vec<i32>,
    log_priors: Vec<f64>,
    means: Vec<Vec<f64>>,
    variances: Vec<Vec<f64>>,
}

impl GaussianNb {
    /// Fit per-class priors, means and variances.
    pub fn fit(x: &[Vec<f64>], y: &[i32]) -> Result<Self> {
        if x.is_empty() {
            bail!("Cannot fit on an empty training set");
        }
        if x.len() != y.len() {
            bail!("feature matrix has {} rows but {} labels", x.len(), y.len());
        }
        let n_features = x[0].len();
        if n_features == 0 {
            bail!("Cannot fit with zero features");
        }
        if x.iter().any(|row| row.len() != n_features) {
            bail!("feature matrix rows have inconsistent widths");
        }

        let mut classes: Vec<i32> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        if classes.len() < 2 {
            bail!("Training set contains a single class; nothing to discriminate");
        }

        // Smoothing scale: largest per-feature variance over the whole set
        let global_variances = feature_variances(x, &(0..x.len()).collect::<Vec<_>>(), n_features);
        let epsilon = VAR_SMOOTHING
            * global_variances
                .iter()
                .cloned()
                .fold(f64::EPSILON, f64::max);

        let n_total = x.len() as f64;
        let mut log_priors = Vec::with_capacity(classes.len());
        let mut means = Vec::with_capacity(classes.len());
        let mut variances = Vec::with_capacity(classes.len());

        for &class in &classes {
            let indices: Vec<usize> = y
                .iter()
                .enumerate()
                .filter(|(_, &label)| label == class)
                .map(|(i, _)| i)
                .collect();
            log_priors.push((indices.len() as f64 / n_total).ln());

            let class_means = feature_means(x, &indices, n_features);
            let mut class_vars = feature_variances(x, &indices, n_features);
            for v in &mut class_vars {
                *v += epsilon;
            }
            means.push(class_means);
            variances.push(class_vars);
        }

        Ok(Self {
            classes,
            log_priors,
            means,
            variances,
        })
    }

    /// The class labels in the order `predict_proba` reports them.
    pub fn classes(&self) -> &[i32] {
        &self.classes
    }

    /// Predicted label per row (argmax of the joint log-likelihood).
    pub fn predict(&self, x: &[Vec<f64>]) -> Vec<i32> {
        x.iter()
            .map(|row| {
                let jll = self.joint_log_likelihood(row);
                let best = jll
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                self.classes[best]
            })
            .collect()
    }

    /// Per-class posterior probabilities per row, normalized via
    /// log-sum-exp. Column order matches `classes()`.
    pub fn predict_proba(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        x.iter()
            .map(|row| {
                let jll = self.joint_log_likelihood(row);
                let max = jll.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let exp: Vec<f64> = jll.iter().map(|&l| (l - max).exp()).collect();
                let total: f64 = exp.iter().sum();
                exp.into_iter().map(|e| e / total).collect()
            })
            .collect()
    }

    fn joint_log_likelihood(&self, row: &[f64]) -> Vec<f64> {
        self.classes
            .iter()
            .enumerate()
            .map(|(c, _)| {
                let mut ll = self.log_priors[c];
                for (f, &value) in row.iter().enumerate() {
                    let mean = self.means[c][f];
                    let var = self.variances[c][f];
                    ll += -0.5 * ((2.0 * std::f64::consts::PI * var).ln()
                        + (value - mean) * (value - mean) / var);
                }
                ll
            })
            .collect()
    }
}

fn feature_means(x: &[Vec<f64>], indices: &[usize], n_features: usize) -> Vec<f64> {
    let mut means = vec![0.0; n_features];
    for &i in indices {
        for (f, value) in x[i].iter().enumerate() {
            means[f] += value;
        }
    }
    let n = indices.len() as f64;
    for m in &mut means {
        *m /= n;
    }
    means
}

fn feature_variances(x: &[Vec<f64>], indices: &[usize], n_features: usize) -> Vec<f64> {
    let means = feature_means(x, indices, n_features);
    let mut vars = vec![0.0; n_features];
    for &i in indices {
        for (f, value) in x[i].iter().enumerate() {
            let d = value - means[f];
            vars[f] += d * d;
        }
    }
    let n = indices.len() as f64;
    for v in &mut vars {
        *v /= n;
    }
    vars
}
