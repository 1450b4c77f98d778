//! Price statistics business logic - Handles price history and collection
//! value tracking.
//!
//! Price observations and value snapshots are append-only time series. The
//! collection value is always computed from the current ownership ledger;
//! snapshots record that number so growth can be charted over time.

use crate::{
    entities::{PricePoint, ValueSnapshot, price_point, value_snapshot},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Appends a price observation for a card key, stamped with the current
/// time.
pub async fn record_price_observation(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
    price: f64,
) -> Result<price_point::Model> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::Config {
            message: format!("Price must be a non-negative finite number, got {price}"),
        });
    }

    let observation = price_point::ActiveModel {
        set_code: Set(set_code.to_string()),
        card_number: Set(card_number),
        price: Set(price),
        timestamp: Set(chrono::Utc::now()),
        ..Default::default()
    };

    observation.insert(db).await.map_err(Into::into)
}

/// Retrieves the full price history of a card key, oldest first.
pub async fn price_history(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
) -> Result<Vec<price_point::Model>> {
    PricePoint::find()
        .filter(price_point::Column::SetCode.eq(set_code))
        .filter(price_point::Column::CardNumber.eq(card_number))
        .order_by_asc(price_point::Column::Timestamp)
        .order_by_asc(price_point::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the most recent price observation for a card key, if any.
pub async fn latest_price(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
) -> Result<Option<price_point::Model>> {
    PricePoint::find()
        .filter(price_point::Column::SetCode.eq(set_code))
        .filter(price_point::Column::CardNumber.eq(card_number))
        .order_by_desc(price_point::Column::Timestamp)
        .order_by_desc(price_point::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Computes the total value of the ownership ledger.
///
/// Each row contributes quantity times its stored unit price; rows without
/// a price contribute nothing.
pub async fn collection_value(db: &DatabaseConnection) -> Result<f64> {
    let entries = crate::core::collection::all_entries(db).await?;
    Ok(entries
        .iter()
        .filter_map(|e| e.price.map(|p| p * f64::from(e.quantity)))
        .sum())
}

/// Computes the current collection value and appends it as a snapshot,
/// stamped with the current time.
pub async fn record_value_snapshot(db: &DatabaseConnection) -> Result<value_snapshot::Model> {
    let total_value = collection_value(db).await?;

    let snapshot = value_snapshot::ActiveModel {
        timestamp: Set(chrono::Utc::now()),
        total_value: Set(total_value),
        ..Default::default()
    };

    snapshot.insert(db).await.map_err(Into::into)
}

/// Retrieves all recorded value snapshots, oldest first.
pub async fn value_history(db: &DatabaseConnection) -> Result<Vec<value_snapshot::Model>> {
    ValueSnapshot::find()
        .order_by_asc(value_snapshot::Column::Timestamp)
        .order_by_asc(value_snapshot::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
