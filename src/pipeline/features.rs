//! Derived feature engineering: temporal buckets and per-store cancel rates

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashMap;

use super::filter::STATUS_CANCELED;

/// Timestamp formats seen in the raw extracts. The primary export format is
/// US-style 12-hour; ISO variants cover re-exported files.
const MOMENT_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Where the per-store cancel rate statistic is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum CancelRateScope {
    /// Over every filtered row, before the split. Reproduces the original
    /// behaviour; leaks test-row outcomes into a training feature.
    FullDataset,
    /// Over the training partition only; test rows get the learned per-store
    /// rate, falling back to the global training rate for unseen stores.
    TrainOnly,
}

/// Add `day_of_week` (Monday=0), `is_weekend` and `period` columns.
///
/// An unparseable or missing timestamp, or an hour outside 0-23, is a fatal
/// data-quality error rather than a silent null.
pub fn add_temporal_features(df: &DataFrame) -> Result<DataFrame> {
    let moments = string_values(df, "order_moment_created")?;

    let mut day_of_week: Vec<i32> = Vec::with_capacity(moments.len());
    for (row, moment) in moments.iter().enumerate() {
        let moment = moment
            .as_deref()
            .with_context(|| format!("order_moment_created is null at row {}", row))?;
        let parsed = parse_moment(moment)
            .with_context(|| format!("Unparseable order_moment_created '{}' at row {}", moment, row))?;
        day_of_week.push(parsed.weekday().num_days_from_monday() as i32);
    }

    let is_weekend: Vec<i32> = day_of_week
        .iter()
        .map(|&d| if d == 5 || d == 6 { 1 } else { 0 })
        .collect();

    let hours_col = df
        .column("order_created_hour")
        .context("merged table is missing order_created_hour")?
        .cast(&DataType::Int64)
        .context("order_created_hour is not numeric")?;
    let mut period: Vec<i32> = Vec::with_capacity(df.height());
    for (row, hour) in hours_col.i64()?.into_iter().enumerate() {
        let hour = hour.with_context(|| format!("order_created_hour is null at row {}", row))?;
        period.push(period_of_hour(hour).with_context(|| {
            format!("order_created_hour {} out of range at row {}", hour, row)
        })?);
    }

    let mut out = df.clone();
    out.with_column(Series::new("day_of_week".into(), day_of_week))?;
    out.with_column(Series::new("is_weekend".into(), is_weekend))?;
    out.with_column(Series::new("period".into(), period))?;
    Ok(out)
}

fn parse_moment(value: &str) -> Option<NaiveDateTime> {
    MOMENT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}

/// Bucket an hour of day into four half-open ranges:
/// [0,6) night, [6,12) morning, [12,18) afternoon, [18,24) evening.
fn period_of_hour(hour: i64) -> Option<i32> {
    match hour {
        0..=5 => Some(0),
        6..=11 => Some(1),
        12..=17 => Some(2),
        18..=23 => Some(3),
        _ => None,
    }
}

/// Add `store_cancel_rate`: the fraction of a store's orders that were
/// canceled, broadcast to every row of that store.
///
/// With `train_mask` = `None` the rate is computed over all rows. With a
/// mask, only rows flagged `true` contribute counts; rows whose store never
/// appears in the masked subset (and rows with no matched store) receive the
/// global rate of the masked subset.
pub fn add_store_cancel_rate(df: &DataFrame, train_mask: Option<&[bool]>) -> Result<DataFrame> {
    let names = string_values(df, "store_name")?;
    let statuses = string_values(df, "order_status")?;

    if let Some(mask) = train_mask {
        if mask.len() != df.height() {
            bail!(
                "train mask length {} does not match row count {}",
                mask.len(),
                df.height()
            );
        }
    }

    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut global = (0usize, 0usize);
    for (row, (name, status)) in names.iter().zip(statuses.iter()).enumerate() {
        if let Some(mask) = train_mask {
            if !mask[row] {
                continue;
            }
        }
        let canceled = status.as_deref() == Some(STATUS_CANCELED);
        global.1 += 1;
        if canceled {
            global.0 += 1;
        }
        if let Some(name) = name.as_deref() {
            let entry = counts.entry(name).or_insert((0, 0));
            entry.1 += 1;
            if canceled {
                entry.0 += 1;
            }
        }
    }

    if global.1 == 0 {
        bail!("Cannot compute store cancel rates over an empty subset");
    }
    let global_rate = global.0 as f64 / global.1 as f64;

    let rates: Vec<f64> = names
        .iter()
        .map(|name| match name.as_deref().and_then(|n| counts.get(n)) {
            Some(&(canceled, total)) => canceled as f64 / total as f64,
            None => global_rate,
        })
        .collect();

    let mut out = df.clone();
    out.with_column(Series::new("store_cancel_rate".into(), rates))?;
    Ok(out)
}

/// Materialize a column as owned optional strings, casting when needed.
fn string_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let col = df
        .column(column)
        .with_context(|| format!("merged table is missing {}", column))?;
    let col = if col.dtype() == &DataType::String {
        col.clone()
    } else {
        col.cast(&DataType::String)
            .with_context(|| format!("{} cannot be read as strings", column))?
    };
    Ok(col
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}
