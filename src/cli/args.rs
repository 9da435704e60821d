//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::pipeline::{CancelRateScope, OutlierCaps, PipelineConfig, SeedStrategy};

/// Ordercast - predict delivery order cancellation from CSV extracts
#[derive(Parser, Debug)]
#[command(name = "ordercast")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the seven CSV extracts
    /// (orders, stores, payments, channels, hubs, deliveries, drivers)
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Fraction of rows held out for the test partition
    #[arg(long, default_value = "0.2", value_parser = validate_fraction)]
    pub test_fraction: f64,

    /// Random seed for split, oversampling and cross-validation.
    /// When omitted, a time-derived seed is used and reported for replay.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Target minority share of the balanced training set
    #[arg(long, default_value = "0.6", value_parser = validate_fraction)]
    pub smote_ratio: f64,

    /// Number of nearest minority neighbours used for interpolation
    #[arg(long, default_value = "5", value_parser = validate_neighbours)]
    pub smote_neighbours: usize,

    /// Number of stratified cross-validation folds
    #[arg(long, default_value = "5")]
    pub cv_folds: usize,

    /// Upper cap applied to order_amount
    #[arg(long, default_value = "246.15")]
    pub cap_order_amount: f64,

    /// Upper cap applied to delivery_distance_meters
    #[arg(long, default_value = "6806.0")]
    pub cap_delivery_distance: f64,

    /// Upper cap applied to store_cancel_rate
    #[arg(long, default_value = "0.10")]
    pub cap_store_cancel_rate: f64,

    /// Compute store cancel rates from the training partition only,
    /// instead of the whole filtered dataset
    #[arg(long, default_value = "false")]
    pub train_only_cancel_rate: bool,

    /// Number of rows to use for CSV schema inference.
    /// Use 0 for a full table scan (slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Write the full run report as JSON to this path
    #[arg(long)]
    pub export_report: Option<PathBuf>,
}

impl Cli {
    /// Build the pipeline configuration from the parsed arguments.
    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            data_dir: self.data_dir.clone(),
            test_fraction: self.test_fraction,
            seed: match self.seed {
                Some(seed) => SeedStrategy::Fixed(seed),
                None => SeedStrategy::TimeDerived,
            },
            smote_ratio: self.smote_ratio,
            smote_neighbours: self.smote_neighbours,
            cv_folds: self.cv_folds,
            caps: OutlierCaps {
                order_amount: self.cap_order_amount,
                delivery_distance_meters: self.cap_delivery_distance,
                store_cancel_rate: self.cap_store_cancel_rate,
            },
            cancel_rate_scope: if self.train_only_cancel_rate {
                CancelRateScope::TrainOnly
            } else {
                CancelRateScope::FullDataset
            },
            infer_schema_length: self.infer_schema_length,
        }
    }
}

/// Validator for the neighbour count, which interpolation needs at least 1 of
fn validate_neighbours(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value == 0 {
        Err("neighbour count must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for fraction parameters that must lie strictly inside (0, 1)
fn validate_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value <= 0.0 || value >= 1.0 {
        Err(format!("value must be between 0.0 and 1.0 exclusive, got {}", value))
    } else {
        Ok(value)
    }
}
