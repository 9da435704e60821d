//! Categorical encoding and target binarization

use anyhow::{bail, Context, Result};
use polars::prelude::*;

use super::filter::{STATUS_CANCELED, STATUS_FINISHED};
use super::select::TARGET_COLUMN;

/// Low-cardinality nominal columns, one-hot encoded with drop-first.
pub const ONE_HOT_COLUMNS: [&str; 4] = ["store_segment", "hub_city", "hub_state", "channel_type"];

/// High-cardinality identifier columns, label-encoded to dense codes.
pub const LABEL_COLUMNS: [&str; 3] = ["store_name", "hub_name", "channel_name"];

/// A fitted label-to-code mapping for one identifier column.
///
/// Classes are sorted, so codes are stable for a given category set. The
/// same fitted mapping must be reused for any later-arriving data; an
/// unseen value at transform time is an error, not a fresh code.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LabelCodes {
    pub column: String,
    pub classes: Vec<String>,
}

impl LabelCodes {
    /// Fit the mapping from a column's distinct non-null values.
    pub fn fit(df: &DataFrame, column: &str) -> Result<Self> {
        let col = df
            .column(column)
            .with_context(|| format!("table is missing label column {}", column))?;
        let mut classes: Vec<String> = col
            .str()
            .with_context(|| format!("Label column '{}' is not a string column", column))?
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect();
        classes.sort();
        classes.dedup();
        if classes.is_empty() {
            bail!("Label column '{}' has no non-null values to encode", column);
        }
        Ok(Self {
            column: column.to_string(),
            classes,
        })
    }

    /// Map a column's values through the fitted codes.
    pub fn transform(&self, df: &DataFrame) -> Result<Vec<u32>> {
        let col = df.column(&self.column)?;
        let mut codes = Vec::with_capacity(df.height());
        for (row, value) in col.str()?.into_iter().enumerate() {
            let value = value.with_context(|| {
                format!("Label column '{}' is null at row {}", self.column, row)
            })?;
            let code = self
                .classes
                .binary_search_by(|c| c.as_str().cmp(value))
                .map_err(|_| {
                    anyhow::anyhow!(
                        "Unseen value '{}' in label column '{}'",
                        value,
                        self.column
                    )
                })?;
            codes.push(code as u32);
        }
        Ok(codes)
    }
}

/// The fully numeric output of the encoder: a row-major feature matrix with
/// stable column names, a binary target (FINISHED=1, CANCELED=0), and the
/// fitted label mappings for reuse.
#[derive(Debug, Clone)]
pub struct EncodedDataset {
    pub feature_names: Vec<String>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<i32>,
    pub label_codes: Vec<LabelCodes>,
}

/// Encode the cleaned table into a numeric matrix.
///
/// The target is separated before any transform. One-hot columns expand to
/// sorted-category indicators with the first category dropped; identifier
/// columns become dense integer codes; originals are discarded.
pub fn encode_features(df: &DataFrame) -> Result<EncodedDataset> {
    let y = binarize_target(df)?;

    let mut feature_names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    // Numeric passthrough, in table order
    for col in df.get_columns() {
        let name = col.name().as_str();
        if name == TARGET_COLUMN
            || ONE_HOT_COLUMNS.contains(&name)
            || LABEL_COLUMNS.contains(&name)
        {
            continue;
        }
        let casted = col
            .cast(&DataType::Float64)
            .with_context(|| format!("Feature column '{}' is not numeric", name))?;
        let mut values = Vec::with_capacity(df.height());
        for (row, v) in casted.f64()?.into_iter().enumerate() {
            values.push(v.with_context(|| {
                format!("Feature column '{}' is null at row {} after imputation", name, row)
            })?);
        }
        feature_names.push(name.to_string());
        columns.push(values);
    }

    // One-hot with drop-first over sorted categories
    for name in ONE_HOT_COLUMNS {
        let values: Vec<&str> = collect_strings(df, name)?;
        let mut categories: Vec<&str> = values.clone();
        categories.sort();
        categories.dedup();
        for category in categories.iter().skip(1) {
            let indicator: Vec<f64> = values
                .iter()
                .map(|v| if v == category { 1.0 } else { 0.0 })
                .collect();
            feature_names.push(format!("{}_{}", name, category));
            columns.push(indicator);
        }
    }

    // Label encoding for the identifier columns
    let mut label_codes = Vec::with_capacity(LABEL_COLUMNS.len());
    for name in LABEL_COLUMNS {
        let codes = LabelCodes::fit(df, name)?;
        let encoded: Vec<f64> = codes.transform(df)?.into_iter().map(f64::from).collect();
        feature_names.push(format!("{}_encoded", name));
        columns.push(encoded);
        label_codes.push(codes);
    }

    // Column-major to row-major
    let n_rows = df.height();
    let mut x = vec![Vec::with_capacity(columns.len()); n_rows];
    for column in &columns {
        for (row, value) in column.iter().enumerate() {
            x[row].push(*value);
        }
    }

    Ok(EncodedDataset {
        feature_names,
        x,
        y,
        label_codes,
    })
}

/// FINISHED maps to 1, CANCELED to 0. Any other status this late in the
/// pipeline means the leakage filter was skipped.
fn binarize_target(df: &DataFrame) -> Result<Vec<i32>> {
    let status = df
        .column(TARGET_COLUMN)
        .context("table is missing the target column")?
        .str()?;
    let mut y = Vec::with_capacity(df.height());
    for (row, value) in status.into_iter().enumerate() {
        match value {
            Some(STATUS_FINISHED) => y.push(1),
            Some(STATUS_CANCELED) => y.push(0),
            other => bail!(
                "Unexpected order_status {:?} at row {}; only terminal statuses may be encoded",
                other,
                row
            ),
        }
    }
    Ok(y)
}

fn collect_strings<'a>(df: &'a DataFrame, name: &str) -> Result<Vec<&'a str>> {
    let col = df
        .column(name)
        .with_context(|| format!("table is missing one-hot column {}", name))?;
    let chunked = col
        .str()
        .with_context(|| format!("One-hot column '{}' is not a string column", name))?;
    let mut values = Vec::with_capacity(df.height());
    for (row, v) in chunked.into_iter().enumerate() {
        values.push(v.with_context(|| {
            format!("One-hot column '{}' is null at row {} after imputation", name, row)
        })?);
    }
    Ok(values)
}
