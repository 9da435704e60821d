//! Fixed feature-set projection

use anyhow::{bail, Result};
use polars::prelude::*;

/// The only columns allowed to reach the model, before encoding expansion.
pub const FEATURE_COLUMNS: [&str; 17] = [
    // Numeric
    "order_amount",
    "order_delivery_fee",
    "order_created_hour",
    "delivery_distance_meters",
    "store_plan_price",
    "day_of_week",
    "store_cancel_rate",
    // Binary
    "is_weekend",
    "has_driver",
    // Categorical
    "store_name",
    "store_segment",
    "hub_name",
    "hub_city",
    "hub_state",
    "channel_name",
    "channel_type",
    "period",
];

pub const TARGET_COLUMN: &str = "order_status";

/// Project the merged table down to the fixed feature set plus the target,
/// discarding every other joined or derived column.
///
/// A missing column means the raw extracts no longer match the hardcoded
/// feature list, which is a fatal precondition failure.
pub fn select_features(df: &DataFrame) -> Result<DataFrame> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<&str> = FEATURE_COLUMNS
        .iter()
        .chain(std::iter::once(&TARGET_COLUMN))
        .filter(|c| !available.contains(&c.to_string()))
        .copied()
        .collect();

    if !missing.is_empty() {
        bail!(
            "Schema drift: expected column(s) {:?} not present after merge. Available columns: {:?}",
            missing,
            available
        );
    }

    let mut selection: Vec<&str> = vec![TARGET_COLUMN];
    selection.extend(FEATURE_COLUMNS);
    Ok(df.select(selection)?)
}
