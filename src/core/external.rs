//! External snapshot business logic - Handles imported partner collections
//! and wishlists.
//!
//! External snapshots are read-mostly copies of someone else's cards: a
//! named parent row plus child card rows, created atomically at import time
//! and deleted wholesale. They feed the trade matcher and are never touched
//! by the user's own ledger operations.

use crate::{
    entities::{
        ExternalCollection, ExternalCollectionCard, ExternalWishlist, ExternalWishlistCard,
        MasterCard, external_collection, external_collection_card, external_wishlist,
        external_wishlist_card, master_card,
    },
    errors::{Error, Result},
};
use sea_orm::{JoinType, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};

/// One already-parsed card entry destined for an external snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalEntry {
    /// Set code of the card
    pub set_code: String,
    /// Collector number of the card within its set
    pub card_number: i32,
    /// Number of copies in the snapshot
    pub quantity: i32,
    /// Optional unit price, only meaningful for collection snapshots
    pub price: Option<f64>,
}

/// One external collection card paired with its catalog card.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalCollectionRow {
    /// The snapshot card entry
    pub entry: external_collection_card::Model,
    /// The matching catalog row, None when the key is not in the catalog
    pub card: Option<master_card::Model>,
}

/// One external wishlist card paired with its catalog card.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalWishlistRow {
    /// The snapshot card entry
    pub entry: external_wishlist_card::Model,
    /// The matching catalog row, None when the key is not in the catalog
    pub card: Option<master_card::Model>,
}

fn collection_master_relation() -> RelationDef {
    ExternalCollectionCard::belongs_to(MasterCard)
        .from((
            external_collection_card::Column::SetCode,
            external_collection_card::Column::CardNumber,
        ))
        .to((
            master_card::Column::SetCode,
            master_card::Column::CardNumber,
        ))
        .into()
}

fn wishlist_master_relation() -> RelationDef {
    ExternalWishlistCard::belongs_to(MasterCard)
        .from((
            external_wishlist_card::Column::SetCode,
            external_wishlist_card::Column::CardNumber,
        ))
        .to((
            master_card::Column::SetCode,
            master_card::Column::CardNumber,
        ))
        .into()
}

/// Creates an external collection snapshot with all of its card rows in one
/// transaction.
///
/// Entries with a quantity of zero or less are not persisted, matching the
/// ledgers' no-empty-rows invariant. The snapshot becomes observable only
/// once fully written.
pub async fn create_collection(
    db: &DatabaseConnection,
    name: String,
    entries: Vec<ExternalEntry>,
) -> Result<external_collection::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "External collection name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let parent = external_collection::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    };
    let parent = parent.insert(&txn).await?;

    let rows: Vec<external_collection_card::ActiveModel> = entries
        .into_iter()
        .filter(|e| e.quantity > 0)
        .map(|e| external_collection_card::ActiveModel {
            collection_id: Set(parent.id),
            set_code: Set(e.set_code),
            card_number: Set(e.card_number),
            quantity: Set(e.quantity),
            price: Set(e.price),
        })
        .collect();

    if !rows.is_empty() {
        ExternalCollectionCard::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(parent)
}

/// Creates an external wishlist snapshot with all of its card rows in one
/// transaction. Prices on the entries are ignored; wishlists carry none.
pub async fn create_wishlist(
    db: &DatabaseConnection,
    name: String,
    entries: Vec<ExternalEntry>,
) -> Result<external_wishlist::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "External wishlist name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let parent = external_wishlist::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    };
    let parent = parent.insert(&txn).await?;

    let rows: Vec<external_wishlist_card::ActiveModel> = entries
        .into_iter()
        .filter(|e| e.quantity > 0)
        .map(|e| external_wishlist_card::ActiveModel {
            wishlist_id: Set(parent.id),
            set_code: Set(e.set_code),
            card_number: Set(e.card_number),
            quantity: Set(e.quantity),
        })
        .collect();

    if !rows.is_empty() {
        ExternalWishlistCard::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(parent)
}

/// Deletes an external collection and all of its card rows in one
/// transaction.
pub async fn delete_collection(db: &DatabaseConnection, collection_id: i32) -> Result<()> {
    let txn = db.begin().await?;

    ExternalCollection::find_by_id(collection_id)
        .one(&txn)
        .await?
        .ok_or(Error::ExternalNotFound { id: collection_id })?;

    ExternalCollectionCard::delete_many()
        .filter(external_collection_card::Column::CollectionId.eq(collection_id))
        .exec(&txn)
        .await?;
    ExternalCollection::delete_by_id(collection_id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(())
}

/// Deletes an external wishlist and all of its card rows in one transaction.
pub async fn delete_wishlist(db: &DatabaseConnection, wishlist_id: i32) -> Result<()> {
    let txn = db.begin().await?;

    ExternalWishlist::find_by_id(wishlist_id)
        .one(&txn)
        .await?
        .ok_or(Error::ExternalNotFound { id: wishlist_id })?;

    ExternalWishlistCard::delete_many()
        .filter(external_wishlist_card::Column::WishlistId.eq(wishlist_id))
        .exec(&txn)
        .await?;
    ExternalWishlist::delete_by_id(wishlist_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Retrieves all external collections, ordered alphabetically by name.
pub async fn list_collections(db: &DatabaseConnection) -> Result<Vec<external_collection::Model>> {
    ExternalCollection::find()
        .order_by_asc(external_collection::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all external wishlists, ordered alphabetically by name.
pub async fn list_wishlists(db: &DatabaseConnection) -> Result<Vec<external_wishlist::Model>> {
    ExternalWishlist::find()
        .order_by_asc(external_wishlist::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the cards of an external collection joined to the catalog,
/// ordered by card name. An unknown id yields an empty listing.
pub async fn collection_rows(
    db: &DatabaseConnection,
    collection_id: i32,
) -> Result<Vec<ExternalCollectionRow>> {
    let rows = ExternalCollectionCard::find()
        .filter(external_collection_card::Column::CollectionId.eq(collection_id))
        .join(JoinType::LeftJoin, collection_master_relation())
        .select_also(MasterCard)
        .order_by_asc(master_card::Column::CardName)
        .order_by_asc(external_collection_card::Column::SetCode)
        .order_by_asc(external_collection_card::Column::CardNumber)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(entry, card)| ExternalCollectionRow { entry, card })
        .collect())
}

/// Retrieves the cards of an external wishlist joined to the catalog,
/// ordered by card name. An unknown id yields an empty listing.
pub async fn wishlist_rows(
    db: &DatabaseConnection,
    wishlist_id: i32,
) -> Result<Vec<ExternalWishlistRow>> {
    let rows = ExternalWishlistCard::find()
        .filter(external_wishlist_card::Column::WishlistId.eq(wishlist_id))
        .join(JoinType::LeftJoin, wishlist_master_relation())
        .select_also(MasterCard)
        .order_by_asc(master_card::Column::CardName)
        .order_by_asc(external_wishlist_card::Column::SetCode)
        .order_by_asc(external_wishlist_card::Column::CardNumber)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(entry, card)| ExternalWishlistRow { entry, card })
        .collect())
}
