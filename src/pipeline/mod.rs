//! Pipeline module - the sequential stages and the run orchestrator
//!
//! Control flow is strictly linear: load, join, filter, engineer, select,
//! impute, cap, encode, split, balance, train, evaluate. Every stage runs
//! exactly once over an in-memory table; each consumes its input and
//! produces a new owned output.

pub mod balance;
pub mod encode;
pub mod features;
pub mod filter;
pub mod impute;
pub mod join;
pub mod loader;
pub mod outliers;
pub mod select;
pub mod split;

pub use balance::*;
pub use encode::*;
pub use features::*;
pub use filter::*;
pub use impute::*;
pub use join::*;
pub use loader::*;
pub use outliers::*;
pub use select::*;
pub use split::*;

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::model::{evaluate, stratified_cv_accuracy, Evaluation, GaussianNb};
use crate::utils::{
    create_spinner, finish_with_success, print_count, print_info, print_step_header,
    print_step_time, print_success,
};

/// Everything that varies between runs, in one place.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub test_fraction: f64,
    pub seed: SeedStrategy,
    pub smote_ratio: f64,
    pub smote_neighbours: usize,
    pub cv_folds: usize,
    pub caps: OutlierCaps,
    pub cancel_rate_scope: CancelRateScope,
    pub infer_schema_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            test_fraction: 0.2,
            seed: SeedStrategy::Fixed(42),
            smote_ratio: 0.6,
            smote_neighbours: 5,
            cv_folds: 5,
            caps: OutlierCaps::default(),
            cancel_rate_scope: CancelRateScope::FullDataset,
            infer_schema_length: 10_000,
        }
    }
}

/// Everything a completed run produced, serializable for replay and audit.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub generated_at: String,
    pub seed: u64,
    pub config: PipelineConfig,
    pub rows_loaded: usize,
    pub rows_after_filter: usize,
    pub canceled_count: usize,
    pub finished_count: usize,
    pub feature_names: Vec<String>,
    pub train_size: usize,
    pub test_size: usize,
    pub balanced_train_size: usize,
    pub balanced_minority_share: f64,
    pub cv_accuracy: Vec<f64>,
    pub evaluation: Evaluation,
}

/// Run the whole pipeline once, printing step progress along the way.
pub fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    let seed = config.seed.resolve();
    print_info(&format!("Using seed {}", seed));

    // Step 1: Load
    print_step_header(1, "Load Extracts");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading CSV extracts...");
    let tables = loader::load_tables(&config.data_dir, config.infer_schema_length)?;
    let rows_loaded = tables.orders.height();
    finish_with_success(&spinner, &format!("{} orders loaded", rows_loaded));
    print_step_time(step_start.elapsed());

    // Step 2: Join
    print_step_header(2, "Join Extracts");
    let step_start = Instant::now();
    let merged = join::merge_tables(&tables)?;
    if merged.height() != rows_loaded {
        bail!(
            "Join changed the row count: {} orders in, {} rows out",
            rows_loaded,
            merged.height()
        );
    }
    print_success(&format!(
        "Merged table: {} rows x {} columns",
        merged.height(),
        merged.width()
    ));
    print_step_time(step_start.elapsed());

    // Step 3: Leakage filter
    print_step_header(3, "Filter Terminal Statuses");
    let step_start = Instant::now();
    let filtered = filter::filter_terminal_orders(&merged)?;
    let (canceled_count, finished_count) = filter::class_counts(&filtered)?;
    print_count("rows kept", filtered.height(), None);
    print_count("CANCELED", canceled_count, None);
    print_count("FINISHED", finished_count, None);
    print_step_time(step_start.elapsed());

    // The split assignment is drawn from the terminal statuses up front so
    // the train-only cancel-rate scope can reuse the exact same partition.
    let y_status = binary_statuses(&filtered)?;
    let indices = split::stratified_split(&y_status, config.test_fraction, seed)?;

    // Step 4: Feature engineering
    print_step_header(4, "Engineer Features");
    let step_start = Instant::now();
    let with_temporal = features::add_temporal_features(&filtered)?;
    let train_mask = indices.train_mask(with_temporal.height());
    let mask = match config.cancel_rate_scope {
        CancelRateScope::FullDataset => None,
        CancelRateScope::TrainOnly => Some(train_mask.as_slice()),
    };
    let engineered = features::add_store_cancel_rate(&with_temporal, mask)?;
    print_success("Added day_of_week, is_weekend, period, store_cancel_rate");
    print_step_time(step_start.elapsed());

    // Step 5: Select, impute, cap
    print_step_header(5, "Clean Feature Table");
    let step_start = Instant::now();
    let selected = select::select_features(&engineered)?;
    let imputed = impute::fill_missing(&selected)?;
    let (capped, cap_counts) = outliers::cap_outliers(&imputed, &config.caps)?;
    for (column, count) in &cap_counts {
        print_count(&format!("outlier(s) capped in {}", column), *count, None);
    }
    print_step_time(step_start.elapsed());

    // Step 6: Encode
    print_step_header(6, "Encode Features");
    let step_start = Instant::now();
    let encoded = encode::encode_features(&capped)?;
    print_success(&format!(
        "Numeric matrix: {} rows x {} features",
        encoded.x.len(),
        encoded.feature_names.len()
    ));
    print_step_time(step_start.elapsed());

    // Step 7: Split and balance
    print_step_header(7, "Split and Balance");
    let step_start = Instant::now();
    let (train_x, train_y) = split::take_rows(&encoded.x, &encoded.y, &indices.train);
    let (test_x, test_y) = split::take_rows(&encoded.x, &encoded.y, &indices.test);
    print_count("training rows", train_y.len(), None);
    print_count("test rows", test_y.len(), None);

    let spinner = create_spinner("Oversampling the minority class...");
    let train_zeros = train_y.iter().filter(|&&l| l == 0).count();
    let minority_label = if train_zeros <= train_y.len() - train_zeros {
        0
    } else {
        1
    };
    let (balanced_x, balanced_y) = balance::oversample_minority(
        &train_x,
        &train_y,
        config.smote_ratio,
        config.smote_neighbours,
        seed,
    )?;
    let minority = balanced_y.iter().filter(|&&l| l == minority_label).count();
    let balanced_minority_share = minority as f64 / balanced_y.len() as f64;
    finish_with_success(
        &spinner,
        &format!(
            "Balanced training set: {} rows, minority share {:.1}%",
            balanced_y.len(),
            balanced_minority_share * 100.0
        ),
    );
    print_step_time(step_start.elapsed());

    // Step 8: Train and evaluate
    print_step_header(8, "Train and Evaluate");
    let step_start = Instant::now();
    let spinner = create_spinner("Running cross-validation...");
    let cv_accuracy = stratified_cv_accuracy(&balanced_x, &balanced_y, config.cv_folds, seed)?;
    finish_with_success(&spinner, "Cross-validation complete");

    let model = GaussianNb::fit(&balanced_x, &balanced_y)?;
    let predictions = model.predict(&test_x);
    let finished_index = model
        .classes()
        .iter()
        .position(|&c| c == 1)
        .ok_or_else(|| anyhow::anyhow!("FINISHED class missing from the fitted model"))?;
    let prob_finished: Vec<f64> = model
        .predict_proba(&test_x)
        .into_iter()
        .map(|probs| probs[finished_index])
        .collect();
    let evaluation = evaluate(&test_y, &predictions, &prob_finished)?;
    print_success("Model trained and evaluated");
    print_step_time(step_start.elapsed());

    Ok(RunOutcome {
        generated_at: chrono::Utc::now().to_rfc3339(),
        seed,
        config: config.clone(),
        rows_loaded,
        rows_after_filter: filtered.height(),
        canceled_count,
        finished_count,
        feature_names: encoded.feature_names,
        train_size: train_y.len(),
        test_size: test_y.len(),
        balanced_train_size: balanced_y.len(),
        balanced_minority_share,
        cv_accuracy,
        evaluation,
    })
}

fn binary_statuses(df: &polars::prelude::DataFrame) -> Result<Vec<i32>> {
    use filter::{STATUS_CANCELED, STATUS_FINISHED};
    let status = df.column(select::TARGET_COLUMN)?.str()?;
    let mut y = Vec::with_capacity(df.height());
    for value in status.into_iter() {
        match value {
            Some(STATUS_FINISHED) => y.push(1),
            Some(STATUS_CANCELED) => y.push(0),
            other => bail!("Non-terminal status {:?} survived the filter", other),
        }
    }
    Ok(y)
}
