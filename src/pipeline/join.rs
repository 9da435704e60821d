//! Joins the seven extracts into one table with one row per order

use anyhow::{Context, Result};
use polars::prelude::*;
use std::collections::HashMap;

use super::loader::RawTables;

/// Merge all extracts into a single table keyed by order identity.
///
/// Left joins only: unmatched keys produce nulls, never row loss. Payments
/// are aggregated per order and deliveries deduplicated per order before
/// joining, so the order row count is preserved exactly. Inputs are not
/// mutated.
pub fn merge_tables(tables: &RawTables) -> Result<DataFrame> {
    let payments_agg = aggregate_payments(&tables.payments)?;
    let deliveries_last = dedup_deliveries(&tables.deliveries)?;

    let merged = tables
        .orders
        .clone()
        .lazy()
        .join(
            tables.stores.clone().lazy(),
            [col("store_id")],
            [col("store_id")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            tables.hubs.clone().lazy(),
            [col("hub_id")],
            [col("hub_id")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            tables.channels.clone().lazy(),
            [col("channel_id")],
            [col("channel_id")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            payments_agg.lazy(),
            [col("order_id")],
            [col("order_id")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            deliveries_last.lazy(),
            [col("order_id")],
            [col("order_id")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            tables.drivers.clone().lazy(),
            [col("driver_id")],
            [col("driver_id")],
            JoinArgs::new(JoinType::Left),
        )
        .collect()
        .context("Failed to merge extracts")?;

    add_has_driver(merged)
}

/// Collapse payments to one row per order: total amount plus the first-seen
/// payment method. Stable group order keeps the first-seen tie-break
/// deterministic.
fn aggregate_payments(payments: &DataFrame) -> Result<DataFrame> {
    payments
        .clone()
        .lazy()
        .group_by_stable([col("payment_order_id")])
        .agg([
            col("payment_amount").sum().alias("total_payment_amount"),
            col("payment_method").first().alias("main_payment_method"),
        ])
        .select([
            col("payment_order_id").alias("order_id"),
            col("total_payment_amount"),
            col("main_payment_method"),
        ])
        .collect()
        .context("Failed to aggregate payments per order")
}

/// Keep the last delivery record per order, in input order, restricted to
/// the columns the feature set needs.
fn dedup_deliveries(deliveries: &DataFrame) -> Result<DataFrame> {
    let slim = deliveries
        .select(["delivery_order_id", "driver_id", "delivery_distance_meters"])
        .context("deliveries extract is missing an expected column")?;

    let ids_col = slim
        .column("delivery_order_id")?
        .cast(&DataType::Int64)
        .context("delivery_order_id is not an integer key")?;
    let ids = ids_col.i64()?;

    let mut last_index: HashMap<Option<i64>, usize> = HashMap::new();
    for (idx, id) in ids.into_iter().enumerate() {
        last_index.insert(id, idx);
    }

    let keep: Vec<bool> = ids
        .into_iter()
        .enumerate()
        .map(|(idx, id)| last_index[&id] == idx)
        .collect();
    let mask = BooleanChunked::from_slice("keep".into(), &keep);

    let mut deduped = slim.filter(&mask)?;
    deduped.rename("delivery_order_id", "order_id".into())?;
    // polars 0.46 `rename` leaves a stale cached schema behind, which the
    // lazy engine would read; drop it so the rename is visible downstream.
    deduped.clear_schema();
    Ok(deduped)
}

/// Derive `has_driver` = 1 when a driver matched the delivery, else 0.
fn add_has_driver(mut df: DataFrame) -> Result<DataFrame> {
    let has_driver: Vec<i32> = df
        .column("driver_id")
        .context("merged table is missing driver_id")?
        .as_materialized_series()
        .iter()
        .map(|value| if value.is_null() { 0 } else { 1 })
        .collect();

    df.with_column(Series::new("has_driver".into(), has_driver))?;
    Ok(df)
}
