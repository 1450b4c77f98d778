//! Ownership ledger business logic - Handles all owned-card operations.
//!
//! The ledger stores one row per owned card key with a quantity, an optional
//! unit price, and free-form notes. Quantity changes go through a single
//! atomic add-then-prune unit so that no committed row ever carries a
//! quantity of zero or less. All functions are async and return Result types
//! for error handling.

use crate::{
    core::filter::{LedgerFilter, SortKey},
    entities::{CardColor, CollectionCard, MasterCard, collection_card, master_card},
    errors::{Error, Result},
};
use sea_orm::{
    JoinType, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

/// One ledger row paired with its catalog card, when the catalog knows the key.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRow {
    /// The owned-card ledger entry
    pub entry: collection_card::Model,
    /// The matching catalog row, None when the key is not in the catalog
    pub card: Option<master_card::Model>,
}

/// Ad-hoc join from ledger rows to the catalog on the composite card key.
fn master_relation() -> RelationDef {
    CollectionCard::belongs_to(MasterCard)
        .from((
            collection_card::Column::SetCode,
            collection_card::Column::CardNumber,
        ))
        .to((
            master_card::Column::SetCode,
            master_card::Column::CardNumber,
        ))
        .into()
}

/// Adds a signed quantity delta to an owned-card row, creating or pruning it
/// as needed, and returns the surviving row.
///
/// The whole unit runs in one database transaction: an upsert adds the delta
/// to the existing quantity (or inserts a fresh row carrying the delta and
/// the given color), then any row at or below zero is deleted. `None` means
/// the delta drove the quantity to zero or below, or a non-positive delta
/// targeted a missing row. The color only applies to newly created rows;
/// existing rows keep their stored color, price, and notes.
pub async fn upsert_quantity(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
    delta: i32,
    color: CardColor,
) -> Result<Option<collection_card::Model>> {
    let txn = db.begin().await?;

    let row = collection_card::ActiveModel {
        set_code: Set(set_code.to_string()),
        card_number: Set(card_number),
        quantity: Set(delta),
        price: Set(None),
        color: Set(color),
        personal_notes: Set(None),
        general_notes: Set(None),
    };

    CollectionCard::insert(row)
        .on_conflict(
            OnConflict::columns([
                collection_card::Column::SetCode,
                collection_card::Column::CardNumber,
            ])
            .value(
                collection_card::Column::Quantity,
                Expr::col(collection_card::Column::Quantity).add(delta),
            )
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    // Prune the row in the same transaction if the delta emptied it
    CollectionCard::delete_many()
        .filter(collection_card::Column::SetCode.eq(set_code))
        .filter(collection_card::Column::CardNumber.eq(card_number))
        .filter(collection_card::Column::Quantity.lte(0))
        .exec(&txn)
        .await?;

    let survivor = CollectionCard::find_by_id((set_code.to_string(), card_number))
        .one(&txn)
        .await?;

    txn.commit().await?;
    Ok(survivor)
}

/// Adds copies of a cataloged card to the ledger.
///
/// This is the manual-entry path: the delta must be positive and the key
/// must exist in the master catalog, which also supplies the stored color.
/// Unlike [`upsert_quantity`], unknown keys are rejected rather than
/// accepted with a caller-provided color.
pub async fn add_from_catalog(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
    delta: i32,
) -> Result<collection_card::Model> {
    if delta <= 0 {
        return Err(Error::InvalidQuantity { quantity: delta });
    }

    let card = crate::core::catalog::get_card(db, set_code, card_number)
        .await?
        .ok_or_else(|| Error::CardNotFound {
            set_code: set_code.to_string(),
            card_number,
        })?;

    // Stored quantities and the delta are both positive, so the row survives
    upsert_quantity(db, set_code, card_number, delta, card.color)
        .await?
        .ok_or_else(|| Error::EntryNotFound {
            set_code: set_code.to_string(),
            card_number,
        })
}

/// Removes a ledger row regardless of its quantity.
///
/// Removal is idempotent: the return value reports whether a row was
/// actually deleted, and removing a missing key is not an error.
pub async fn remove_entry(db: &DatabaseConnection, set_code: &str, card_number: i32) -> Result<bool> {
    let outcome = CollectionCard::delete_many()
        .filter(collection_card::Column::SetCode.eq(set_code))
        .filter(collection_card::Column::CardNumber.eq(card_number))
        .exec(db)
        .await?;
    Ok(outcome.rows_affected > 0)
}

/// Sets or clears the stored unit price of an existing ledger row.
pub async fn set_price(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
    price: Option<f64>,
) -> Result<collection_card::Model> {
    if let Some(value) = price {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::Config {
                message: format!("Price must be a non-negative finite number, got {value}"),
            });
        }
    }

    let entry = CollectionCard::find_by_id((set_code.to_string(), card_number))
        .one(db)
        .await?
        .ok_or_else(|| Error::EntryNotFound {
            set_code: set_code.to_string(),
            card_number,
        })?;

    let mut active: collection_card::ActiveModel = entry.into();
    active.price = Set(price);
    active.update(db).await.map_err(Into::into)
}

/// Sets or clears both note fields of an existing ledger row.
pub async fn set_notes(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
    personal_notes: Option<String>,
    general_notes: Option<String>,
) -> Result<collection_card::Model> {
    let entry = CollectionCard::find_by_id((set_code.to_string(), card_number))
        .one(db)
        .await?
        .ok_or_else(|| Error::EntryNotFound {
            set_code: set_code.to_string(),
            card_number,
        })?;

    let mut active: collection_card::ActiveModel = entry.into();
    active.personal_notes = Set(personal_notes);
    active.general_notes = Set(general_notes);
    active.update(db).await.map_err(Into::into)
}

/// Point read of a single ledger row by its card key.
pub async fn get_entry(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
) -> Result<Option<collection_card::Model>> {
    CollectionCard::find_by_id((set_code.to_string(), card_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all ledger rows, ordered by set code and collector number.
///
/// This is the plain unfiltered listing used by export and by the value
/// statistics.
pub async fn all_entries(db: &DatabaseConnection) -> Result<Vec<collection_card::Model>> {
    CollectionCard::find()
        .order_by_asc(collection_card::Column::SetCode)
        .order_by_asc(collection_card::Column::CardNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves ledger rows matching a filter, joined to the catalog for
/// display fields.
///
/// The name and color axes match against the catalog, so entries the
/// catalog does not know never match those axes. The sort key orders the
/// result, with set code and collector number as tiebreakers so the order
/// is a deterministic total order.
pub async fn filtered_rows(
    db: &DatabaseConnection,
    filter: &LedgerFilter,
) -> Result<Vec<CollectionRow>> {
    let mut query = CollectionCard::find()
        .join(JoinType::LeftJoin, master_relation())
        .select_also(MasterCard);

    if let Some(fragment) = &filter.name_contains {
        query = query.filter(master_card::Column::CardName.contains(fragment.as_str()));
    }
    if let Some(color) = filter.color {
        query = query.filter(master_card::Column::Color.eq(color));
    }
    if let Some(set_code) = &filter.set_code {
        query = query.filter(collection_card::Column::SetCode.eq(set_code.as_str()));
    }

    let query = match filter.sort {
        SortKey::Name => query.order_by_asc(master_card::Column::CardName),
        SortKey::Number => query,
        SortKey::Color => query.order_by_asc(master_card::Column::Color),
    };

    let rows = query
        .order_by_asc(collection_card::Column::SetCode)
        .order_by_asc(collection_card::Column::CardNumber)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(entry, card)| CollectionRow { entry, card })
        .collect())
}
