//! Integration tests for filtering, feature engineering, imputation and
//! outlier capping

use ordercast::pipeline::{
    add_store_cancel_rate, add_temporal_features, cap_outliers, fill_missing,
    filter_terminal_orders, merge_tables, select_features, OutlierCaps,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_filter_keeps_only_terminal_statuses() {
    let tables = common::raw_tables();
    let merged = merge_tables(&tables).unwrap();
    let filtered = filter_terminal_orders(&merged).unwrap();

    // Order 4 is IN PROGRESS and must be dropped
    assert_eq!(filtered.height(), 4);
    let statuses: Vec<Option<&str>> = filtered
        .column("order_status")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    for status in statuses {
        assert!(matches!(status, Some("CANCELED") | Some("FINISHED")));
    }
}

#[test]
fn test_temporal_features() {
    let df = df! {
        "order_moment_created" => [
            "3/1/2021 9:00:00 AM",   // Monday
            "3/6/2021 11:30:00 PM",  // Saturday
            "3/7/2021 12:15:00 AM",  // Sunday
        ],
        "order_created_hour" => [9i64, 23, 0],
    }
    .unwrap();

    let out = add_temporal_features(&df).unwrap();

    let dow: Vec<i32> = out.column("day_of_week").unwrap().i32().unwrap().into_iter().flatten().collect();
    assert_eq!(dow, vec![0, 5, 6]);

    let weekend: Vec<i32> = out.column("is_weekend").unwrap().i32().unwrap().into_iter().flatten().collect();
    assert_eq!(weekend, vec![0, 1, 1]);

    let period: Vec<i32> = out.column("period").unwrap().i32().unwrap().into_iter().flatten().collect();
    assert_eq!(period, vec![1, 3, 0]);
}

#[test]
fn test_temporal_features_reject_bad_timestamp() {
    let df = df! {
        "order_moment_created" => ["garbage"],
        "order_created_hour" => [9i64],
    }
    .unwrap();
    assert!(add_temporal_features(&df).is_err());
}

#[test]
fn test_temporal_features_reject_out_of_range_hour() {
    let df = df! {
        "order_moment_created" => ["3/1/2021 9:00:00 AM"],
        "order_created_hour" => [24i64],
    }
    .unwrap();
    assert!(add_temporal_features(&df).is_err());
}

#[test]
fn test_selector_projects_fixed_columns() {
    let tables = common::raw_tables();
    let merged = merge_tables(&tables).unwrap();
    let filtered = filter_terminal_orders(&merged).unwrap();
    let with_temporal = add_temporal_features(&filtered).unwrap();
    let engineered = add_store_cancel_rate(&with_temporal, None).unwrap();

    let selected = select_features(&engineered).unwrap();
    assert_eq!(selected.width(), 18, "17 features plus the target");
    assert!(selected.column("total_payment_amount").is_err());
    assert!(selected.column("driver_modal").is_err());
}

#[test]
fn test_selector_fails_on_missing_column() {
    let df = df! {
        "order_status" => ["CANCELED"],
        "order_amount" => [10.0f64],
    }
    .unwrap();
    let err = select_features(&df).unwrap_err();
    assert!(err.to_string().contains("Schema drift"));
}

#[test]
fn test_imputer_fills_median_and_mode() {
    let df = df! {
        "order_status" => ["CANCELED", "FINISHED", "FINISHED", "CANCELED"],
        "delivery_distance_meters" => [Some(100.0f64), None, Some(300.0), Some(200.0)],
        "store_plan_price" => [Some(10.0f64), Some(20.0), None, None],
        "store_segment" => [Some("FOOD"), Some("FOOD"), None, Some("GOOD")],
    }
    .unwrap();

    let out = fill_missing(&df).unwrap();

    let distances: Vec<f64> = out
        .column("delivery_distance_meters")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(distances[1], 200.0, "null replaced by the column median");

    let segments: Vec<Option<&str>> = out
        .column("store_segment")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(segments[2], Some("FOOD"), "null replaced by the column mode");

    let total_nulls: usize = out.get_columns().iter().map(|c| c.null_count()).sum();
    assert_eq!(total_nulls, 0);
}

#[test]
fn test_imputer_is_idempotent() {
    let df = df! {
        "order_status" => ["CANCELED", "FINISHED", "FINISHED"],
        "delivery_distance_meters" => [Some(100.0f64), None, Some(300.0)],
        "store_plan_price" => [1.0f64, 2.0, 3.0],
        "store_segment" => ["FOOD", "FOOD", "GOOD"],
    }
    .unwrap();

    let once = fill_missing(&df).unwrap();
    let twice = fill_missing(&once).unwrap();
    assert!(once.equals_missing(&twice));
}

#[test]
fn test_imputer_rejects_entirely_null_numeric_column() {
    let df = df! {
        "order_status" => ["CANCELED", "FINISHED"],
        "delivery_distance_meters" => [None::<f64>, None],
        "store_plan_price" => [1.0f64, 2.0],
    }
    .unwrap();

    let err = fill_missing(&df).unwrap_err();
    assert!(err.to_string().contains("entirely null"));
}

#[test]
fn test_imputer_rejects_unresolvable_nulls_elsewhere() {
    let df = df! {
        "order_status" => ["CANCELED", "FINISHED"],
        "delivery_distance_meters" => [100.0f64, 200.0],
        "store_plan_price" => [1.0f64, 2.0],
        "order_amount" => [Some(10.0f64), None],
    }
    .unwrap();

    let err = fill_missing(&df).unwrap_err();
    assert!(err.to_string().contains("order_amount"));
}

#[test]
fn test_capping_is_bounded_and_identity_below_threshold() {
    let df = df! {
        "order_amount" => [100.0f64, 246.15, 500.0],
        "delivery_distance_meters" => [1000.0f64, 9000.0, 6806.0],
        "store_cancel_rate" => [0.05f64, 0.2, 0.1],
    }
    .unwrap();

    let caps = OutlierCaps::default();
    let (out, counts) = cap_outliers(&df, &caps).unwrap();

    let amounts: Vec<f64> = out.column("order_amount").unwrap().f64().unwrap().into_iter().flatten().collect();
    assert_eq!(amounts, vec![100.0, 246.15, 246.15]);

    let distances: Vec<f64> = out.column("delivery_distance_meters").unwrap().f64().unwrap().into_iter().flatten().collect();
    assert_eq!(distances, vec![1000.0, 6806.0, 6806.0]);

    let rates: Vec<f64> = out.column("store_cancel_rate").unwrap().f64().unwrap().into_iter().flatten().collect();
    assert_eq!(rates, vec![0.05, 0.1, 0.1]);

    let capped_totals: Vec<usize> = counts.iter().map(|(_, n)| *n).collect();
    assert_eq!(capped_totals, vec![1, 1, 1]);
}

#[test]
fn test_capping_twice_changes_nothing() {
    let df = df! {
        "order_amount" => [100.0f64, 500.0],
        "delivery_distance_meters" => [1000.0f64, 9000.0],
        "store_cancel_rate" => [0.05f64, 0.2],
    }
    .unwrap();

    let caps = OutlierCaps::default();
    let (once, _) = cap_outliers(&df, &caps).unwrap();
    let (twice, counts) = cap_outliers(&once, &caps).unwrap();
    assert!(once.equals_missing(&twice));
    assert!(counts.iter().all(|(_, n)| *n == 0));
}
