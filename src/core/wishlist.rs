//! Wishlist ledger business logic - Handles all wanted-card operations.
//!
//! The wishlist is the simpler sibling of the ownership ledger: one row per
//! wanted card key with a quantity and nothing else. Quantity changes use
//! the same atomic add-then-prune unit, so no committed row ever carries a
//! quantity of zero or less.

use crate::{
    core::filter::{LedgerFilter, SortKey},
    entities::{MasterCard, WishlistCard, master_card, wishlist_card},
    errors::Result,
};
use sea_orm::{
    JoinType, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

/// One wishlist row paired with its catalog card, when the catalog knows
/// the key.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistRow {
    /// The wanted-card ledger entry
    pub entry: wishlist_card::Model,
    /// The matching catalog row, None when the key is not in the catalog
    pub card: Option<master_card::Model>,
}

/// Ad-hoc join from wishlist rows to the catalog on the composite card key.
fn master_relation() -> RelationDef {
    WishlistCard::belongs_to(MasterCard)
        .from((
            wishlist_card::Column::SetCode,
            wishlist_card::Column::CardNumber,
        ))
        .to((
            master_card::Column::SetCode,
            master_card::Column::CardNumber,
        ))
        .into()
}

/// Adds a signed quantity delta to a wishlist row, creating or pruning it
/// as needed, and returns the surviving row.
///
/// Same transactional unit as the ownership ledger: upsert the delta, then
/// delete the row if the result is zero or below. `None` means the row was
/// pruned or a non-positive delta targeted a missing row.
pub async fn upsert_quantity(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
    delta: i32,
) -> Result<Option<wishlist_card::Model>> {
    let txn = db.begin().await?;

    let row = wishlist_card::ActiveModel {
        set_code: Set(set_code.to_string()),
        card_number: Set(card_number),
        quantity: Set(delta),
    };

    WishlistCard::insert(row)
        .on_conflict(
            OnConflict::columns([
                wishlist_card::Column::SetCode,
                wishlist_card::Column::CardNumber,
            ])
            .value(
                wishlist_card::Column::Quantity,
                Expr::col(wishlist_card::Column::Quantity).add(delta),
            )
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    WishlistCard::delete_many()
        .filter(wishlist_card::Column::SetCode.eq(set_code))
        .filter(wishlist_card::Column::CardNumber.eq(card_number))
        .filter(wishlist_card::Column::Quantity.lte(0))
        .exec(&txn)
        .await?;

    let survivor = WishlistCard::find_by_id((set_code.to_string(), card_number))
        .one(&txn)
        .await?;

    txn.commit().await?;
    Ok(survivor)
}

/// Removes a wishlist row regardless of its quantity; idempotent.
pub async fn remove_entry(db: &DatabaseConnection, set_code: &str, card_number: i32) -> Result<bool> {
    let outcome = WishlistCard::delete_many()
        .filter(wishlist_card::Column::SetCode.eq(set_code))
        .filter(wishlist_card::Column::CardNumber.eq(card_number))
        .exec(db)
        .await?;
    Ok(outcome.rows_affected > 0)
}

/// Point read of a single wishlist row by its card key.
pub async fn get_entry(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
) -> Result<Option<wishlist_card::Model>> {
    WishlistCard::find_by_id((set_code.to_string(), card_number))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all wishlist rows, ordered by set code and collector number.
pub async fn all_entries(db: &DatabaseConnection) -> Result<Vec<wishlist_card::Model>> {
    WishlistCard::find()
        .order_by_asc(wishlist_card::Column::SetCode)
        .order_by_asc(wishlist_card::Column::CardNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves wishlist rows matching a filter, joined to the catalog for
/// display fields. Same filter semantics as the ownership ledger.
pub async fn filtered_rows(
    db: &DatabaseConnection,
    filter: &LedgerFilter,
) -> Result<Vec<WishlistRow>> {
    let mut query = WishlistCard::find()
        .join(JoinType::LeftJoin, master_relation())
        .select_also(MasterCard);

    if let Some(fragment) = &filter.name_contains {
        query = query.filter(master_card::Column::CardName.contains(fragment.as_str()));
    }
    if let Some(color) = filter.color {
        query = query.filter(master_card::Column::Color.eq(color));
    }
    if let Some(set_code) = &filter.set_code {
        query = query.filter(wishlist_card::Column::SetCode.eq(set_code.as_str()));
    }

    let query = match filter.sort {
        SortKey::Name => query.order_by_asc(master_card::Column::CardName),
        SortKey::Number => query,
        SortKey::Color => query.order_by_asc(master_card::Column::Color),
    };

    let rows = query
        .order_by_asc(wishlist_card::Column::SetCode)
        .order_by_asc(wishlist_card::Column::CardNumber)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(entry, card)| WishlistRow { entry, card })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::CardColor, test_utils::*};

    #[tokio::test]
    async fn test_upsert_and_prune() -> Result<()> {
        let db = setup_test_db().await?;

        let row = upsert_quantity(&db, "S2", 1, 2).await?;
        assert_eq!(row.unwrap().quantity, 2);

        let row = upsert_quantity(&db, "S2", 1, -2).await?;
        assert!(row.is_none());
        assert!(get_entry(&db, "S2", 1).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_delta_sequence_matches_running_sum() -> Result<()> {
        let db = setup_test_db().await?;

        for delta in [4, -1, -1, 3] {
            upsert_quantity(&db, "S1", 5, delta).await?;
        }

        let entry = get_entry(&db, "S1", 5).await?.unwrap();
        assert_eq!(entry.quantity, 5);

        Ok(())
    }

    #[tokio::test]
    async fn test_remove_entry_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;

        upsert_quantity(&db, "S1", 1, 1).await?;
        assert!(remove_entry(&db, "S1", 1).await?);
        assert!(!remove_entry(&db, "S1", 1).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_filtered_rows_joins_catalog_names() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;

        upsert_quantity(&db, "S1", 2, 1).await?;
        upsert_quantity(&db, "S2", 1, 3).await?;

        let rows = filtered_rows(&db, &LedgerFilter::default()).await?;
        assert_eq!(rows.len(), 2);

        // Name order: Blue Djinn before Crimson Ogre
        assert_eq!(rows[0].card.as_ref().unwrap().card_name, "Blue Djinn");
        assert_eq!(rows[1].card.as_ref().unwrap().card_name, "Crimson Ogre");
        assert_eq!(rows[1].entry.quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_filtered_rows_color_filter() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;

        upsert_quantity(&db, "S1", 1, 1).await?;
        upsert_quantity(&db, "S1", 2, 1).await?;

        let filter = LedgerFilter {
            color: Some(CardColor::Blue),
            ..LedgerFilter::default()
        };
        let rows = filtered_rows(&db, &filter).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry.card_number, 2);

        Ok(())
    }
}
