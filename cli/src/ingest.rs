//! CSV ingest for the simulation harness: orders carry an ISO-8601
//! timestamp, drivers carry a status string.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use dispatch_core::coordinate::Coordinate;
use dispatch_core::driver::{Driver, DriverStatus};
use dispatch_core::order::{Order, OrderId};

#[derive(Debug, Deserialize)]
struct OrderRow {
    order_id: String,
    created_at: String,
    pickup_lat: f64,
    pickup_lon: f64,
    dropoff_lat: f64,
    dropoff_lon: f64,
    merchant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DriverRow {
    driver_id: String,
    lat: f64,
    lon: f64,
    status: String,
    max_capacity: u32,
}

/// Parses an orders CSV into `Order`s, with `created_at` read as
/// RFC 3339 and converted to epoch seconds. A row whose `order_id` isn't
/// a valid UUID is generated a fresh one rather than rejecting the row.
pub fn read_orders(path: &Path) -> anyhow::Result<Vec<Order>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut orders = Vec::new();

    for record in reader.deserialize() {
        let row: OrderRow = record?;

        let id = OrderId::parse_str(&row.order_id).unwrap_or_else(|_| OrderId::new_v4());
        let created_at_secs = chrono::DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.timestamp().max(0) as u64)
            .map_err(|e| anyhow::anyhow!("invalid created_at '{}': {e}", row.created_at))?;

        orders.push(Order::new_raw(
            id,
            Coordinate::new(row.pickup_lat, row.pickup_lon),
            Coordinate::new(row.dropoff_lat, row.dropoff_lon),
            row.merchant_id,
            created_at_secs,
            None,
        ));
    }

    Ok(orders)
}

/// Parses a drivers CSV into `Driver`s. An unrecognized `status` value
/// fails the whole ingest rather than silently defaulting a courier to
/// AVAILABLE.
pub fn read_drivers(path: &Path) -> anyhow::Result<Vec<Driver>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut drivers = Vec::new();

    for record in reader.deserialize() {
        let row: DriverRow = record?;
        let status = DriverStatus::from_str(&row.status)?;

        drivers.push(
            Driver::new(row.driver_id, Coordinate::new(row.lat, row.lon), status)
                .with_capacity(row.max_capacity),
        );
    }

    Ok(drivers)
}
