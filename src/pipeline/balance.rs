//! Synthetic minority oversampling for the training partition

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

/// Failure modes of the oversampler that callers may want to distinguish.
#[derive(Debug, Error)]
pub enum BalanceError {
    #[error(
        "minority class has {count} sample(s) but interpolation needs at least {required} ({k} neighbours + 1)"
    )]
    NotEnoughNeighbours {
        count: usize,
        required: usize,
        k: usize,
    },
    #[error("target minority ratio must be in (0, 1), got {0}")]
    InvalidRatio(f64),
    #[error("neighbour count must be at least 1")]
    ZeroNeighbours,
}

/// Oversample the minority class until it makes up `target_ratio` of the
/// resulting set, by interpolating each synthetic sample between a random
/// minority row and one of its `k` nearest minority neighbours.
///
/// Applied to the training partition only; callers must never pass test
/// rows through here. A no-op when the minority already meets the ratio.
pub fn oversample_minority(
    x: &[Vec<f64>],
    y: &[i32],
    target_ratio: f64,
    k: usize,
    seed: u64,
) -> Result<(Vec<Vec<f64>>, Vec<i32>)> {
    if !(0.0..1.0).contains(&target_ratio) || target_ratio == 0.0 {
        return Err(BalanceError::InvalidRatio(target_ratio).into());
    }
    if k == 0 {
        return Err(BalanceError::ZeroNeighbours.into());
    }
    if x.len() != y.len() {
        bail!("feature matrix has {} rows but {} labels", x.len(), y.len());
    }

    let (minority_label, majority_count) = minority_class(y)?;
    let minority_indices: Vec<usize> = y
        .iter()
        .enumerate()
        .filter(|(_, &label)| label == minority_label)
        .map(|(i, _)| i)
        .collect();
    let minority_count = minority_indices.len();

    // minority / (minority + majority) = ratio  =>  minority = ratio/(1-ratio) * majority
    let target_count =
        ((target_ratio / (1.0 - target_ratio)) * majority_count as f64).round() as usize;
    if target_count <= minority_count {
        return Ok((x.to_vec(), y.to_vec()));
    }
    let needed = target_count - minority_count;

    if minority_count <= k {
        return Err(BalanceError::NotEnoughNeighbours {
            count: minority_count,
            required: k + 1,
            k,
        }
        .into());
    }

    let minority_rows: Vec<&Vec<f64>> = minority_indices.iter().map(|&i| &x[i]).collect();
    let neighbours = nearest_neighbours(&minority_rows, k);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut out_x = x.to_vec();
    let mut out_y = y.to_vec();
    for _ in 0..needed {
        let i = rng.gen_range(0..minority_count);
        let j = neighbours[i][rng.gen_range(0..k)];
        let t: f64 = rng.gen();
        let synthetic: Vec<f64> = minority_rows[i]
            .iter()
            .zip(minority_rows[j].iter())
            .map(|(a, b)| a + t * (b - a))
            .collect();
        out_x.push(synthetic);
        out_y.push(minority_label);
    }

    Ok((out_x, out_y))
}

/// (minority label, majority count). Requires both classes to be present.
fn minority_class(y: &[i32]) -> Result<(i32, usize)> {
    let zeros = y.iter().filter(|&&l| l == 0).count();
    let ones = y.len() - zeros;
    if zeros == 0 || ones == 0 {
        bail!("Cannot balance a single-class training set");
    }
    if zeros <= ones {
        Ok((0, ones))
    } else {
        Ok((1, zeros))
    }
}

/// For each row, the indices of its `k` nearest other rows by Euclidean
/// distance. Brute force, parallel across rows; distance ties resolve by
/// lower index so results are deterministic.
fn nearest_neighbours(rows: &[&Vec<f64>], k: usize) -> Vec<Vec<usize>> {
    rows.par_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut distances: Vec<(f64, usize)> = rows
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(j, other)| (squared_distance(row, other), j))
                .collect();
            distances.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            });
            distances.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
