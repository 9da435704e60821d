//! Stratified train/test partitioning with explicit seeding

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;

/// How the run's random seed is chosen. The resolved value is always
/// recorded in the run report so any run can be replayed.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum SeedStrategy {
    Fixed(u64),
    TimeDerived,
}

impl SeedStrategy {
    pub fn resolve(&self) -> u64 {
        match self {
            SeedStrategy::Fixed(seed) => *seed,
            SeedStrategy::TimeDerived => chrono::Utc::now().timestamp_millis() as u64,
        }
    }
}

/// Row indices of the two partitions, each sorted ascending.
#[derive(Debug, Clone)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl SplitIndices {
    /// Boolean per-row membership mask for the training partition.
    pub fn train_mask(&self, n_rows: usize) -> Vec<bool> {
        let mut mask = vec![false; n_rows];
        for &idx in &self.train {
            mask[idx] = true;
        }
        mask
    }
}

/// Stratified random split: each class is shuffled and divided separately so
/// both partitions preserve the overall class proportions.
pub fn stratified_split(y: &[i32], test_fraction: f64, seed: u64) -> Result<SplitIndices> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        bail!("test fraction must be in (0, 1), got {}", test_fraction);
    }
    if y.is_empty() {
        bail!("Cannot split an empty dataset");
    }

    // BTreeMap keeps per-class iteration order deterministic
    let mut by_class: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in y.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (label, mut indices) in by_class {
        let n = indices.len();
        let n_test = (n as f64 * test_fraction).round() as usize;
        if n_test == 0 || n_test >= n {
            bail!(
                "Class {} has only {} sample(s); cannot keep both partitions non-empty at test fraction {}",
                label,
                n,
                test_fraction
            );
        }
        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

/// Copy the rows of one partition out of the full matrix.
pub fn take_rows(x: &[Vec<f64>], y: &[i32], indices: &[usize]) -> (Vec<Vec<f64>>, Vec<i32>) {
    let part_x = indices.iter().map(|&i| x[i].clone()).collect();
    let part_y = indices.iter().map(|&i| y[i]).collect();
    (part_x, part_y)
}
