//! Shared test fixtures: in-memory raw tables and synthetic CSV extracts

use ordercast::pipeline::RawTables;
use polars::prelude::*;
use std::io::Write;
use std::path::Path;

/// Small hand-crafted extract set for join-level tests.
///
/// Known characteristics:
/// - order 4 references store 9, which no stores row matches
/// - order 1 has two payments (10 + 5, CREDIT first) and two delivery
///   records (the last one carries driver 11 and distance 200)
/// - order 2's delivery has no driver; orders 4 and 5 have no delivery
/// - order 4 has no payment
pub fn raw_tables() -> RawTables {
    let orders = df! {
        "order_id" => [1i64, 2, 3, 4, 5],
        "store_id" => [1i64, 1, 2, 9, 2],
        "channel_id" => [1i64, 1, 1, 1, 2],
        "order_status" => ["FINISHED", "CANCELED", "FINISHED", "IN PROGRESS", "FINISHED"],
        "order_amount" => [30.0f64, 45.5, 12.0, 80.0, 25.0],
        "order_delivery_fee" => [5.0f64, 0.0, 5.0, 7.5, 5.0],
        "order_created_hour" => [9i64, 14, 20, 3, 11],
        "order_moment_created" => [
            "4/19/2021 9:15:00 AM",
            "4/20/2021 2:30:00 PM",
            "4/24/2021 8:05:00 PM",
            "4/25/2021 3:45:00 AM",
            "4/21/2021 11:59:00 AM",
        ],
    }
    .unwrap();

    let stores = df! {
        "store_id" => [1i64, 2, 3],
        "store_name" => ["Cantina Aurora", "Burger Basement", "Sushi Stop"],
        "store_segment" => ["FOOD", "FOOD", "GOOD"],
        "store_plan_price" => [Some(0.0f64), Some(89.0), None],
        "hub_id" => [1i64, 1, 2],
    }
    .unwrap();

    let payments = df! {
        "payment_order_id" => [1i64, 1, 2, 3, 5],
        "payment_amount" => [10.0f64, 5.0, 20.0, 30.0, 50.0],
        "payment_method" => ["CREDIT", "DEBIT", "CREDIT", "VOUCHER", "DEBIT"],
    }
    .unwrap();

    let channels = df! {
        "channel_id" => [1i64, 2],
        "channel_name" => ["FOOD PLACE", "PHONE PLACE"],
        "channel_type" => ["OWN CHANNEL", "MARKETPLACE"],
    }
    .unwrap();

    let hubs = df! {
        "hub_id" => [1i64, 2],
        "hub_name" => ["RED SHOPPING", "BLUE SHOPPING"],
        "hub_city" => ["PORTO ALEGRE", "SAO PAULO"],
        "hub_state" => ["RS", "SP"],
    }
    .unwrap();

    let deliveries = df! {
        "delivery_order_id" => [1i64, 1, 2, 3],
        "driver_id" => [Some(10i64), Some(11), None, Some(12)],
        "delivery_distance_meters" => [100.0f64, 200.0, 300.0, 400.0],
        "delivery_status" => ["DELIVERED", "DELIVERED", "DELIVERED", "DELIVERED"],
    }
    .unwrap();

    let drivers = df! {
        "driver_id" => [10i64, 11, 12],
        "driver_modal" => ["MOTOBOY", "BIKER", "MOTOBOY"],
        "driver_type" => ["FREELANCE", "LOGISTIC OPERATOR", "FREELANCE"],
    }
    .unwrap();

    RawTables {
        orders,
        stores,
        payments,
        channels,
        hubs,
        deliveries,
        drivers,
    }
}

/// Write a full synthetic extract set (~100 terminal orders, 70/30
/// CANCELED/FINISHED, two stores) into `dir` for end-to-end runs.
///
/// The stores file is deliberately written with Windows-1252 bytes to
/// exercise the Latin-1 tolerant loader. Store 1's plan price is null on
/// every order, store 2's is 50.0, so the column is half missing. Orders
/// 81-100 have no delivery record, leaving their distance null.
pub fn write_synthetic_extracts(dir: &Path) {
    let mut orders = String::from(
        "order_id,store_id,channel_id,order_status,order_amount,order_delivery_fee,order_created_hour,order_moment_created\n",
    );
    for i in 1..=100u32 {
        let status = if (i - 1) % 10 < 7 { "CANCELED" } else { "FINISHED" };
        let store_id = if i % 2 == 0 { 2 } else { 1 };
        let amount = if i == 5 { 500.0 } else { 10.0 + i as f64 };
        let hour = (i * 5) % 24;
        let day = (i % 28) + 1;
        let (hour12, meridiem) = to_twelve_hour(hour);
        orders.push_str(&format!(
            "{},{},1,{},{:.2},5.00,{},3/{}/2021 {}:00:00 {}\n",
            i, store_id, status, amount, hour, day, hour12, meridiem
        ));
    }
    // One in-flight order the leakage filter must drop
    orders.push_str("101,1,1,IN PROGRESS,20.00,5.00,10,3/5/2021 10:00:00 AM\n");
    std::fs::write(dir.join("orders.csv"), orders).unwrap();

    // Windows-1252 encoded bytes: "Padaria S\xe3o Jo\xe3o" is not valid UTF-8
    let mut stores: Vec<u8> = Vec::new();
    stores.extend_from_slice(b"store_id,store_name,store_segment,store_plan_price,hub_id\n");
    stores.extend_from_slice(b"1,Padaria S\xe3o Jo\xe3o,FOOD,,1\n");
    stores.extend_from_slice(b"2,Late Night Grill,GOOD,50.0,2\n");
    let mut file = std::fs::File::create(dir.join("stores.csv")).unwrap();
    file.write_all(&stores).unwrap();

    let mut payments = String::from("payment_order_id,payment_amount,payment_method\n");
    for i in 1..=100u32 {
        payments.push_str(&format!("{},{:.2},CREDIT\n", i, 10.0 + i as f64));
    }
    payments.push_str("1,5.00,DEBIT\n");
    std::fs::write(dir.join("payments.csv"), payments).unwrap();

    std::fs::write(
        dir.join("channels.csv"),
        "channel_id,channel_name,channel_type\n1,FOOD PLACE,OWN CHANNEL\n2,PHONE PLACE,MARKETPLACE\n",
    )
    .unwrap();

    std::fs::write(
        dir.join("hubs.csv"),
        "hub_id,hub_name,hub_city,hub_state\n1,RED SHOPPING,PORTO ALEGRE,RS\n2,BLUE SHOPPING,SAO PAULO,SP\n",
    )
    .unwrap();

    let mut deliveries =
        String::from("delivery_order_id,driver_id,delivery_distance_meters\n");
    for i in 1..=80u32 {
        let driver = if i % 7 == 0 {
            String::new()
        } else {
            (100 + (i % 5)).to_string()
        };
        let distance = if i == 3 { 9999.0 } else { 500.0 + i as f64 * 10.0 };
        deliveries.push_str(&format!("{},{},{:.1}\n", i, driver, distance));
    }
    // Duplicate record for order 1; the later row must win
    deliveries.push_str("1,104,750.0\n");
    std::fs::write(dir.join("deliveries.csv"), deliveries).unwrap();

    let mut drivers = String::from("driver_id,driver_modal,driver_type\n");
    for id in 100..=104u32 {
        drivers.push_str(&format!("{},MOTOBOY,FREELANCE\n", id));
    }
    std::fs::write(dir.join("drivers.csv"), drivers).unwrap();
}

fn to_twelve_hour(hour: u32) -> (u32, &'static str) {
    match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    }
}

/// A cleaned feature table shaped like the selector's output, for encoder
/// and imputation tests.
pub fn cleaned_table() -> DataFrame {
    df! {
        "order_status" => ["CANCELED", "FINISHED", "FINISHED", "CANCELED"],
        "order_amount" => [20.0f64, 30.0, 40.0, 50.0],
        "order_delivery_fee" => [5.0f64, 5.0, 0.0, 7.5],
        "order_created_hour" => [9i64, 14, 20, 3],
        "delivery_distance_meters" => [1000.0f64, 2000.0, 1500.0, 800.0],
        "store_plan_price" => [0.0f64, 89.0, 89.0, 0.0],
        "day_of_week" => [0i32, 1, 5, 6],
        "store_cancel_rate" => [0.5f64, 0.5, 0.0, 0.0],
        "is_weekend" => [0i32, 0, 1, 1],
        "has_driver" => [1i32, 1, 0, 1],
        "store_name" => ["Cantina Aurora", "Cantina Aurora", "Burger Basement", "Burger Basement"],
        "store_segment" => ["FOOD", "FOOD", "GOOD", "GOOD"],
        "hub_name" => ["RED SHOPPING", "RED SHOPPING", "BLUE SHOPPING", "BLUE SHOPPING"],
        "hub_city" => ["PORTO ALEGRE", "PORTO ALEGRE", "SAO PAULO", "SAO PAULO"],
        "hub_state" => ["RS", "RS", "SP", "SP"],
        "channel_name" => ["FOOD PLACE", "FOOD PLACE", "PHONE PLACE", "PHONE PLACE"],
        "channel_type" => ["OWN CHANNEL", "OWN CHANNEL", "MARKETPLACE", "MARKETPLACE"],
        "period" => [1i32, 2, 3, 0],
    }
    .unwrap()
}
