//! Trade matching business logic - Finds card overlaps between the user's
//! ledgers and imported external snapshots.
//!
//! All matchers are read-only inner joins on the composite card key: a row
//! is emitted only when the key appears on both sides. Output is ordered by
//! catalog card name, with uncataloged keys sorted last. An unknown external
//! snapshot or deck id yields an empty result, never an error.

use crate::{
    entities::{
        CardColor, CollectionCard, DeckCard, ExternalCollectionCard, ExternalWishlistCard,
        MasterCard, deck_card, external_collection_card, external_wishlist_card, master_card,
    },
    errors::Result,
};
use sea_orm::prelude::*;
use std::collections::{HashMap, HashSet};

/// One matched card with the quantities held on each side of the trade.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRow {
    /// Set code of the matched card
    pub set_code: String,
    /// Collector number of the matched card within its set
    pub card_number: i32,
    /// Catalog card name, empty when the catalog does not know the key
    pub card_name: String,
    /// Catalog set name, empty when the catalog does not know the key
    pub set_name: String,
    /// Catalog color, None when the catalog does not know the key
    pub color: Option<CardColor>,
    /// Quantity on the trading partner's side
    pub partner_quantity: i32,
    /// Quantity on the user's side (wishlist, collection, or deck)
    pub user_quantity: i32,
}

/// Fetches the catalog rows for a set of card keys in one query, keyed for
/// in-memory lookup. Over-fetches by set code and narrows to the exact keys.
async fn catalog_lookup(
    db: &DatabaseConnection,
    keys: &HashSet<(String, i32)>,
) -> Result<HashMap<(String, i32), master_card::Model>> {
    if keys.is_empty() {
        return Ok(HashMap::new());
    }

    let set_codes: HashSet<&str> = keys.iter().map(|(set_code, _)| set_code.as_str()).collect();
    let masters = MasterCard::find()
        .filter(master_card::Column::SetCode.is_in(set_codes))
        .all(db)
        .await?;

    Ok(masters
        .into_iter()
        .filter(|m| keys.contains(&(m.set_code.clone(), m.card_number)))
        .map(|m| ((m.set_code.clone(), m.card_number), m))
        .collect())
}

fn build_row(
    catalog: &HashMap<(String, i32), master_card::Model>,
    key: (String, i32),
    partner_quantity: i32,
    user_quantity: i32,
) -> TradeRow {
    let card = catalog.get(&key);
    TradeRow {
        card_name: card.map(|c| c.card_name.clone()).unwrap_or_default(),
        set_name: card.map(|c| c.set_name.clone()).unwrap_or_default(),
        color: card.map(|c| c.color),
        set_code: key.0,
        card_number: key.1,
        partner_quantity,
        user_quantity,
    }
}

/// Name order with uncataloged keys last; set code and collector number
/// break ties so the output order is total.
fn sort_rows(rows: &mut [TradeRow]) {
    rows.sort_by(|a, b| {
        (a.card_name.is_empty(), &a.card_name, &a.set_code, a.card_number).cmp(&(
            b.card_name.is_empty(),
            &b.card_name,
            &b.set_code,
            b.card_number,
        ))
    });
}

/// Cards an external collection offers that are on the user's wishlist.
///
/// Partner quantity is the external collection's count, user quantity the
/// wishlist's count.
pub async fn they_have_you_want(
    db: &DatabaseConnection,
    external_collection_id: i32,
) -> Result<Vec<TradeRow>> {
    let theirs = ExternalCollectionCard::find()
        .filter(external_collection_card::Column::CollectionId.eq(external_collection_id))
        .all(db)
        .await?;
    if theirs.is_empty() {
        return Ok(Vec::new());
    }

    let wanted: HashMap<(String, i32), i32> = crate::core::wishlist::all_entries(db)
        .await?
        .into_iter()
        .map(|w| ((w.set_code, w.card_number), w.quantity))
        .collect();

    let keys: HashSet<(String, i32)> = theirs
        .iter()
        .map(|t| (t.set_code.clone(), t.card_number))
        .filter(|key| wanted.contains_key(key))
        .collect();
    let catalog = catalog_lookup(db, &keys).await?;

    let mut rows = Vec::new();
    for their in theirs {
        let partner_quantity = their.quantity;
        let key = (their.set_code, their.card_number);
        if let Some(&user_quantity) = wanted.get(&key) {
            rows.push(build_row(&catalog, key, partner_quantity, user_quantity));
        }
    }

    sort_rows(&mut rows);
    Ok(rows)
}

/// Cards the user owns that are on an external wishlist.
///
/// Partner quantity is the external wishlist's count, user quantity the
/// ownership ledger's count.
pub async fn you_have_they_want(
    db: &DatabaseConnection,
    external_wishlist_id: i32,
) -> Result<Vec<TradeRow>> {
    let theirs = ExternalWishlistCard::find()
        .filter(external_wishlist_card::Column::WishlistId.eq(external_wishlist_id))
        .all(db)
        .await?;
    if theirs.is_empty() {
        return Ok(Vec::new());
    }

    let owned: HashMap<(String, i32), i32> = CollectionCard::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| ((c.set_code, c.card_number), c.quantity))
        .collect();

    let keys: HashSet<(String, i32)> = theirs
        .iter()
        .map(|t| (t.set_code.clone(), t.card_number))
        .filter(|key| owned.contains_key(key))
        .collect();
    let catalog = catalog_lookup(db, &keys).await?;

    let mut rows = Vec::new();
    for their in theirs {
        let partner_quantity = their.quantity;
        let key = (their.set_code, their.card_number);
        if let Some(&user_quantity) = owned.get(&key) {
            rows.push(build_row(&catalog, key, partner_quantity, user_quantity));
        }
    }

    sort_rows(&mut rows);
    Ok(rows)
}

/// Cards in one of the user's decks that are on an external wishlist.
///
/// Partner quantity is the external wishlist's count, user quantity the
/// deck's count.
pub async fn deck_has_they_want(
    db: &DatabaseConnection,
    external_wishlist_id: i32,
    deck_id: i32,
) -> Result<Vec<TradeRow>> {
    let theirs = ExternalWishlistCard::find()
        .filter(external_wishlist_card::Column::WishlistId.eq(external_wishlist_id))
        .all(db)
        .await?;
    if theirs.is_empty() {
        return Ok(Vec::new());
    }

    let in_deck: HashMap<(String, i32), i32> = DeckCard::find()
        .filter(deck_card::Column::DeckId.eq(deck_id))
        .all(db)
        .await?
        .into_iter()
        .map(|d| ((d.set_code, d.card_number), d.quantity))
        .collect();

    let keys: HashSet<(String, i32)> = theirs
        .iter()
        .map(|t| (t.set_code.clone(), t.card_number))
        .filter(|key| in_deck.contains_key(key))
        .collect();
    let catalog = catalog_lookup(db, &keys).await?;

    let mut rows = Vec::new();
    for their in theirs {
        let partner_quantity = their.quantity;
        let key = (their.set_code, their.card_number);
        if let Some(&user_quantity) = in_deck.get(&key) {
            rows.push(build_row(&catalog, key, partner_quantity, user_quantity));
        }
    }

    sort_rows(&mut rows);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{collection, deck, external, wishlist};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_they_have_you_want_intersection() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;

        // Partner offers one card the user wants and nothing else relevant
        let snapshot = external::create_collection(
            &db,
            "Alice".to_string(),
            vec![external_entry("S1", 1, 3, None)],
        )
        .await?;
        wishlist::upsert_quantity(&db, "S1", 1, 2).await?;
        wishlist::upsert_quantity(&db, "S2", 1, 1).await?;

        let rows = they_have_you_want(&db, snapshot.id).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].set_code, "S1");
        assert_eq!(rows[0].card_number, 1);
        assert_eq!(rows[0].partner_quantity, 3);
        assert_eq!(rows[0].user_quantity, 2);
        assert_eq!(rows[0].card_name, "Alpha Drake");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_external_id_yields_empty() -> Result<()> {
        let db = setup_test_db().await?;

        wishlist::upsert_quantity(&db, "S1", 1, 1).await?;
        assert!(they_have_you_want(&db, 999).await?.is_empty());
        assert!(you_have_they_want(&db, 999).await?.is_empty());
        assert!(deck_has_they_want(&db, 999, 1).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_you_have_they_want_ordering() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;

        collection::upsert_quantity(&db, "S2", 1, 4, CardColor::Red).await?;
        collection::upsert_quantity(&db, "S1", 1, 1, CardColor::Red).await?;
        collection::upsert_quantity(&db, "S1", 2, 2, CardColor::Blue).await?;

        let snapshot = external::create_wishlist(
            &db,
            "Bob".to_string(),
            vec![
                external_entry("S2", 1, 1, None),
                external_entry("S1", 1, 2, None),
                external_entry("S1", 2, 1, None),
            ],
        )
        .await?;

        let rows = you_have_they_want(&db, snapshot.id).await?;
        let names: Vec<&str> = rows.iter().map(|r| r.card_name.as_str()).collect();
        assert_eq!(names, ["Alpha Drake", "Blue Djinn", "Crimson Ogre"]);
        assert_eq!(rows[0].partner_quantity, 2);
        assert_eq!(rows[0].user_quantity, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_uncataloged_match_falls_back_to_empty_name() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;

        collection::upsert_quantity(&db, "ZZ", 9, 1, CardColor::Universal).await?;
        collection::upsert_quantity(&db, "S1", 1, 1, CardColor::Red).await?;

        let snapshot = external::create_wishlist(
            &db,
            "Bob".to_string(),
            vec![
                external_entry("ZZ", 9, 1, None),
                external_entry("S1", 1, 1, None),
            ],
        )
        .await?;

        let rows = you_have_they_want(&db, snapshot.id).await?;
        assert_eq!(rows.len(), 2);
        // The cataloged card sorts first; the unknown key falls back to
        // empty display fields and sorts last
        assert_eq!(rows[0].card_name, "Alpha Drake");
        assert_eq!(rows[1].card_name, "");
        assert_eq!(rows[1].set_name, "");
        assert!(rows[1].color.is_none());
        assert_eq!(rows[1].set_code, "ZZ");

        Ok(())
    }

    #[tokio::test]
    async fn test_deck_has_they_want_scoped_to_deck() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;

        let burn = deck::create_deck(&db, "Burn".to_string(), CardColor::Red).await?;
        let other = deck::create_deck(&db, "Other".to_string(), CardColor::Blue).await?;
        deck::upsert_card(&db, burn.id, "S1", 1, 4).await?;
        deck::upsert_card(&db, other.id, "S1", 2, 4).await?;

        let snapshot = external::create_wishlist(
            &db,
            "Bob".to_string(),
            vec![
                external_entry("S1", 1, 2, None),
                external_entry("S1", 2, 2, None),
            ],
        )
        .await?;

        let rows = deck_has_they_want(&db, snapshot.id, burn.id).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].card_number, 1);
        assert_eq!(rows[0].user_quantity, 4);
        assert_eq!(rows[0].partner_quantity, 2);

        // A deck id with no rows matches nothing
        assert!(deck_has_they_want(&db, snapshot.id, 999).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_no_overlap_yields_empty() -> Result<()> {
        let db = setup_test_db().await?;

        let snapshot = external::create_collection(
            &db,
            "Alice".to_string(),
            vec![external_entry("S9", 9, 1, None)],
        )
        .await?;
        wishlist::upsert_quantity(&db, "S1", 1, 1).await?;

        assert!(they_have_you_want(&db, snapshot.id).await?.is_empty());

        Ok(())
    }
}
