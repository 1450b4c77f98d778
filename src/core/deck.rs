//! Deck business logic - Handles deck management and deck card operations.
//!
//! Decks are named groups of cards with a color tag. Deck cards reuse the
//! ledgers' atomic add-then-prune quantity unit, scoped by deck id, and
//! deleting a deck removes its cards in the same transaction.

use crate::{
    entities::{CardColor, Deck, DeckCard, MasterCard, deck, deck_card, master_card},
    errors::{Error, Result},
};
use sea_orm::{
    JoinType, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

/// One deck card paired with its catalog card, when the catalog knows the key.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckRow {
    /// The deck card entry
    pub entry: deck_card::Model,
    /// The matching catalog row, None when the key is not in the catalog
    pub card: Option<master_card::Model>,
}

/// Ad-hoc join from deck cards to the catalog on the composite card key.
fn master_relation() -> RelationDef {
    DeckCard::belongs_to(MasterCard)
        .from((deck_card::Column::SetCode, deck_card::Column::CardNumber))
        .to((
            master_card::Column::SetCode,
            master_card::Column::CardNumber,
        ))
        .into()
}

/// Creates a new deck with the given name and color tag, validating that
/// the name is not empty.
pub async fn create_deck(
    db: &DatabaseConnection,
    name: String,
    color_tag: CardColor,
) -> Result<deck::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Deck name cannot be empty".to_string(),
        });
    }

    let deck = deck::ActiveModel {
        name: Set(name.trim().to_string()),
        color_tag: Set(color_tag),
        ..Default::default()
    };

    deck.insert(db).await.map_err(Into::into)
}

/// Updates the name and color tag of an existing deck.
pub async fn update_deck(
    db: &DatabaseConnection,
    deck_id: i32,
    name: String,
    color_tag: CardColor,
) -> Result<deck::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Deck name cannot be empty".to_string(),
        });
    }

    let existing = Deck::find_by_id(deck_id)
        .one(db)
        .await?
        .ok_or(Error::DeckNotFound { id: deck_id })?;

    let mut active: deck::ActiveModel = existing.into();
    active.name = Set(name.trim().to_string());
    active.color_tag = Set(color_tag);
    active.update(db).await.map_err(Into::into)
}

/// Deletes a deck and all of its cards in one transaction.
pub async fn delete_deck(db: &DatabaseConnection, deck_id: i32) -> Result<()> {
    let txn = db.begin().await?;

    Deck::find_by_id(deck_id)
        .one(&txn)
        .await?
        .ok_or(Error::DeckNotFound { id: deck_id })?;

    // Children first, then the deck row itself
    DeckCard::delete_many()
        .filter(deck_card::Column::DeckId.eq(deck_id))
        .exec(&txn)
        .await?;
    Deck::delete_by_id(deck_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Retrieves all decks, ordered alphabetically by name.
pub async fn list_decks(db: &DatabaseConnection) -> Result<Vec<deck::Model>> {
    Deck::find()
        .order_by_asc(deck::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Point read of a single deck by id.
pub async fn get_deck(db: &DatabaseConnection, deck_id: i32) -> Result<Option<deck::Model>> {
    Deck::find_by_id(deck_id).one(db).await.map_err(Into::into)
}

/// Adds a signed quantity delta to a card in a deck, creating or pruning
/// the row as needed, and returns the surviving row.
///
/// The deck must exist. Otherwise this is the same transactional
/// add-then-prune unit the ledgers use, scoped by deck id.
pub async fn upsert_card(
    db: &DatabaseConnection,
    deck_id: i32,
    set_code: &str,
    card_number: i32,
    delta: i32,
) -> Result<Option<deck_card::Model>> {
    let txn = db.begin().await?;

    Deck::find_by_id(deck_id)
        .one(&txn)
        .await?
        .ok_or(Error::DeckNotFound { id: deck_id })?;

    let row = deck_card::ActiveModel {
        deck_id: Set(deck_id),
        set_code: Set(set_code.to_string()),
        card_number: Set(card_number),
        quantity: Set(delta),
    };

    DeckCard::insert(row)
        .on_conflict(
            OnConflict::columns([
                deck_card::Column::DeckId,
                deck_card::Column::SetCode,
                deck_card::Column::CardNumber,
            ])
            .value(
                deck_card::Column::Quantity,
                Expr::col(deck_card::Column::Quantity).add(delta),
            )
            .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    DeckCard::delete_many()
        .filter(deck_card::Column::DeckId.eq(deck_id))
        .filter(deck_card::Column::SetCode.eq(set_code))
        .filter(deck_card::Column::CardNumber.eq(card_number))
        .filter(deck_card::Column::Quantity.lte(0))
        .exec(&txn)
        .await?;

    let survivor = DeckCard::find_by_id((deck_id, set_code.to_string(), card_number))
        .one(&txn)
        .await?;

    txn.commit().await?;
    Ok(survivor)
}

/// Retrieves the cards of a deck joined to the catalog, ordered by card
/// name. An unknown deck id yields an empty listing.
pub async fn deck_rows(db: &DatabaseConnection, deck_id: i32) -> Result<Vec<DeckRow>> {
    let rows = DeckCard::find()
        .filter(deck_card::Column::DeckId.eq(deck_id))
        .join(JoinType::LeftJoin, master_relation())
        .select_also(MasterCard)
        .order_by_asc(master_card::Column::CardName)
        .order_by_asc(deck_card::Column::SetCode)
        .order_by_asc(deck_card::Column::CardNumber)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(entry, card)| DeckRow { entry, card })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_deck_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_deck(&db, String::new(), CardColor::Red).await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));

        let result = create_deck(&db, "   ".to_string(), CardColor::Red).await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_list_decks() -> Result<()> {
        let db = setup_test_db().await?;

        create_deck(&db, "Burn".to_string(), CardColor::Red).await?;
        create_deck(&db, "Aggro".to_string(), CardColor::Green).await?;

        let decks = list_decks(&db).await?;
        assert_eq!(decks.len(), 2);
        assert_eq!(decks[0].name, "Aggro");
        assert_eq!(decks[1].name, "Burn");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_deck() -> Result<()> {
        let db = setup_test_db().await?;

        let deck = create_deck(&db, "Burn".to_string(), CardColor::Red).await?;
        let updated = update_deck(&db, deck.id, "Control".to_string(), CardColor::Blue).await?;

        assert_eq!(updated.id, deck.id);
        assert_eq!(updated.name, "Control");
        assert_eq!(updated.color_tag, CardColor::Blue);

        let result = update_deck(&db, 999, "Ghost".to_string(), CardColor::Red).await;
        assert!(matches!(result.unwrap_err(), Error::DeckNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_deck_cascades_cards() -> Result<()> {
        let db = setup_test_db().await?;

        let deck = create_deck(&db, "Burn".to_string(), CardColor::Red).await?;
        upsert_card(&db, deck.id, "S1", 1, 4).await?;
        upsert_card(&db, deck.id, "S1", 2, 2).await?;

        delete_deck(&db, deck.id).await?;

        assert!(get_deck(&db, deck.id).await?.is_none());
        let leftovers = DeckCard::find()
            .filter(deck_card::Column::DeckId.eq(deck.id))
            .all(&db)
            .await?;
        assert!(leftovers.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_card_requires_deck() -> Result<()> {
        let db = setup_test_db().await?;

        let result = upsert_card(&db, 42, "S1", 1, 1).await;
        assert!(matches!(result.unwrap_err(), Error::DeckNotFound { id: 42 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_card_accumulates_and_prunes() -> Result<()> {
        let db = setup_test_db().await?;

        let deck = create_deck(&db, "Burn".to_string(), CardColor::Red).await?;

        let row = upsert_card(&db, deck.id, "S1", 1, 3).await?;
        assert_eq!(row.unwrap().quantity, 3);

        let row = upsert_card(&db, deck.id, "S1", 1, -1).await?;
        assert_eq!(row.unwrap().quantity, 2);

        let row = upsert_card(&db, deck.id, "S1", 1, -2).await?;
        assert!(row.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_deck_rows_ordered_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;

        let deck = create_deck(&db, "Mixed".to_string(), CardColor::Multicolor).await?;
        upsert_card(&db, deck.id, "S2", 1, 1).await?;
        upsert_card(&db, deck.id, "S1", 1, 4).await?;

        let rows = deck_rows(&db, deck.id).await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].card.as_ref().unwrap().card_name, "Alpha Drake");
        assert_eq!(rows[1].card.as_ref().unwrap().card_name, "Crimson Ogre");

        // Unknown deck id is an empty listing, not an error
        assert!(deck_rows(&db, 999).await?.is_empty());

        Ok(())
    }
}
