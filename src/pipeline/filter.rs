//! Terminal-status filtering

use anyhow::{Context, Result};
use polars::prelude::*;

pub const STATUS_CANCELED: &str = "CANCELED";
pub const STATUS_FINISHED: &str = "FINISHED";

/// Keep only orders with a terminal status.
///
/// In-flight statuses have no defined outcome and must not reach either
/// split, so they are dropped silently rather than treated as errors.
pub fn filter_terminal_orders(df: &DataFrame) -> Result<DataFrame> {
    let status = df
        .column("order_status")
        .context("merged table is missing order_status")?
        .str()
        .context("order_status is not a string column")?;

    let keep: Vec<bool> = status
        .into_iter()
        .map(|s| matches!(s, Some(STATUS_CANCELED) | Some(STATUS_FINISHED)))
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);

    Ok(df.filter(&mask)?)
}

/// Count (CANCELED, FINISHED) rows, for reporting and stratification checks.
pub fn class_counts(df: &DataFrame) -> Result<(usize, usize)> {
    let status = df.column("order_status")?.str()?;
    let canceled = status
        .into_iter()
        .filter(|s| *s == Some(STATUS_CANCELED))
        .count();
    let finished = status
        .into_iter()
        .filter(|s| *s == Some(STATUS_FINISHED))
        .count();
    Ok((canceled, finished))
}
