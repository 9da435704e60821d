//! Missing-value imputation: numeric medians, categorical modes

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::collections::HashMap;

use super::select::TARGET_COLUMN;

/// Numeric columns known to arrive with gaps in the raw extracts.
pub const NUMERIC_MEDIAN_COLUMNS: [&str; 2] = ["delivery_distance_meters", "store_plan_price"];

/// Fill nulls: median for the fixed numeric set, mode for every string
/// column except the target. Pure: returns a new table.
///
/// Postcondition: zero nulls anywhere. A column the imputer cannot resolve
/// (entirely null, or a null outside the imputable sets) is a fatal
/// data-quality error, never a silent zero-fill. Idempotent by construction.
pub fn fill_missing(df: &DataFrame) -> Result<DataFrame> {
    let mut out = df.clone();

    for name in NUMERIC_MEDIAN_COLUMNS {
        let col = out
            .column(name)
            .with_context(|| format!("table is missing numeric column {}", name))?;
        if col.null_count() == 0 {
            continue;
        }
        let casted = col
            .cast(&DataType::Float64)
            .with_context(|| format!("Column '{}' is not numeric", name))?;
        let series = casted.as_materialized_series();
        let median = series.median().with_context(|| {
            format!("Column '{}' is entirely null; cannot impute a median", name)
        })?;
        let filled: Vec<f64> = series
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(median))
            .collect();
        out.with_column(Series::new(name.into(), filled))?;
    }

    let string_columns: Vec<String> = out
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String && c.name().as_str() != TARGET_COLUMN)
        .map(|c| c.name().to_string())
        .collect();

    for name in string_columns {
        let col = out.column(&name)?;
        if col.null_count() == 0 {
            continue;
        }
        let values: Vec<Option<String>> = col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect();
        let mode = mode_of(&values).with_context(|| {
            format!("Column '{}' is entirely null; cannot impute a mode", name)
        })?;
        let filled: Vec<String> = values
            .into_iter()
            .map(|v| v.unwrap_or_else(|| mode.clone()))
            .collect();
        out.with_column(Series::new(name.as_str().into(), filled))?;
    }

    let unresolved: Vec<String> = out
        .get_columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .map(|c| c.name().to_string())
        .collect();
    if !unresolved.is_empty() {
        bail!(
            "Nulls remain after imputation in column(s) {:?}; the raw extracts have unexpected gaps",
            unresolved
        );
    }

    Ok(out)
}

/// Most frequent non-null value; ties broken by first appearance in row order.
fn mode_of(values: &[Option<String>]) -> Option<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, value) in values.iter().enumerate() {
        if let Some(v) = value.as_deref() {
            let entry = counts.entry(v).or_insert((0, idx));
            entry.0 += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|(value, _)| value.to_string())
}
