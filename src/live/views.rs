//! Live view constructors for every screen-facing query.
//!
//! Each function pairs a read query from [`crate::core`] with the exact set
//! of [`StoreChange`] variants that can alter its result, so a view
//! recomputes when — and only when — something it displays may have
//! changed. Every view also reacts to catalog changes, because the catalog
//! supplies display names, set names, and colors for all of them.

use sea_orm::DatabaseConnection;

use super::bus::{ChangeBus, StoreChange};
use super::query::LiveQuery;
use crate::core::collection::{self, CollectionRow};
use crate::core::deck::{self, DeckRow};
use crate::core::external::{self, ExternalCollectionRow, ExternalWishlistRow};
use crate::core::filter::LedgerFilter;
use crate::core::trade::{self, TradeRow};
use crate::core::wishlist::{self, WishlistRow};

/// Live listing of the ownership ledger under a filter.
pub fn collection_view(
    db: DatabaseConnection,
    bus: &ChangeBus,
    filter: LedgerFilter,
) -> LiveQuery<LedgerFilter, Vec<CollectionRow>> {
    LiveQuery::new(
        db,
        bus,
        filter,
        |_, change| matches!(change, StoreChange::Collection | StoreChange::Catalog),
        |db, filter| async move { collection::filtered_rows(&db, &filter).await },
    )
}

/// Live listing of the wishlist under a filter.
pub fn wishlist_view(
    db: DatabaseConnection,
    bus: &ChangeBus,
    filter: LedgerFilter,
) -> LiveQuery<LedgerFilter, Vec<WishlistRow>> {
    LiveQuery::new(
        db,
        bus,
        filter,
        |_, change| matches!(change, StoreChange::Wishlist | StoreChange::Catalog),
        |db, filter| async move { wishlist::filtered_rows(&db, &filter).await },
    )
}

/// Live listing of one deck's cards. Changes to other decks are ignored.
pub fn deck_view(
    db: DatabaseConnection,
    bus: &ChangeBus,
    deck_id: i32,
) -> LiveQuery<i32, Vec<DeckRow>> {
    LiveQuery::new(
        db,
        bus,
        deck_id,
        |deck_id, change| match change {
            StoreChange::Deck { deck_id: changed } => changed == *deck_id,
            StoreChange::Catalog => true,
            _ => false,
        },
        |db, deck_id| async move { deck::deck_rows(&db, deck_id).await },
    )
}

/// Live listing of one external collection snapshot's cards.
pub fn external_collection_view(
    db: DatabaseConnection,
    bus: &ChangeBus,
    collection_id: i32,
) -> LiveQuery<i32, Vec<ExternalCollectionRow>> {
    LiveQuery::new(
        db,
        bus,
        collection_id,
        |collection_id, change| match change {
            StoreChange::ExternalCollection { id } => id == *collection_id,
            StoreChange::Catalog => true,
            _ => false,
        },
        |db, collection_id| async move { external::collection_rows(&db, collection_id).await },
    )
}

/// Live listing of one external wishlist snapshot's cards.
pub fn external_wishlist_view(
    db: DatabaseConnection,
    bus: &ChangeBus,
    wishlist_id: i32,
) -> LiveQuery<i32, Vec<ExternalWishlistRow>> {
    LiveQuery::new(
        db,
        bus,
        wishlist_id,
        |wishlist_id, change| match change {
            StoreChange::ExternalWishlist { id } => id == *wishlist_id,
            StoreChange::Catalog => true,
            _ => false,
        },
        |db, wishlist_id| async move { external::wishlist_rows(&db, wishlist_id).await },
    )
}

/// Live trade match: cards an external collection offers that are on the
/// user's wishlist. Reacts to that snapshot, the wishlist, and the catalog.
pub fn they_have_you_want_view(
    db: DatabaseConnection,
    bus: &ChangeBus,
    external_collection_id: i32,
) -> LiveQuery<i32, Vec<TradeRow>> {
    LiveQuery::new(
        db,
        bus,
        external_collection_id,
        |collection_id, change| match change {
            StoreChange::ExternalCollection { id } => id == *collection_id,
            StoreChange::Wishlist | StoreChange::Catalog => true,
            _ => false,
        },
        |db, collection_id| async move { trade::they_have_you_want(&db, collection_id).await },
    )
}

/// Live trade match: cards the user owns that are on an external wishlist.
/// Reacts to that snapshot, the ownership ledger, and the catalog.
pub fn you_have_they_want_view(
    db: DatabaseConnection,
    bus: &ChangeBus,
    external_wishlist_id: i32,
) -> LiveQuery<i32, Vec<TradeRow>> {
    LiveQuery::new(
        db,
        bus,
        external_wishlist_id,
        |wishlist_id, change| match change {
            StoreChange::ExternalWishlist { id } => id == *wishlist_id,
            StoreChange::Collection | StoreChange::Catalog => true,
            _ => false,
        },
        |db, wishlist_id| async move { trade::you_have_they_want(&db, wishlist_id).await },
    )
}

/// Live trade match: cards in one of the user's decks that are on an
/// external wishlist. Parameters are `(external_wishlist_id, deck_id)`.
pub fn deck_has_they_want_view(
    db: DatabaseConnection,
    bus: &ChangeBus,
    external_wishlist_id: i32,
    deck_id: i32,
) -> LiveQuery<(i32, i32), Vec<TradeRow>> {
    LiveQuery::new(
        db,
        bus,
        (external_wishlist_id, deck_id),
        |params, change| match change {
            StoreChange::ExternalWishlist { id } => id == params.0,
            StoreChange::Deck { deck_id: changed } => changed == params.1,
            StoreChange::Catalog => true,
            _ => false,
        },
        |db, params| async move { trade::deck_has_they_want(&db, params.0, params.1).await },
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::filter::SortKey;
    use crate::entities::CardColor;
    use crate::errors::Result;
    use crate::test_utils::*;
    use std::time::Duration;
    use tokio::time::timeout;

    const SNAPSHOT_WAIT: Duration = Duration::from_millis(500);
    const SILENCE_WAIT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_collection_view_follows_ledger_changes() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;
        let bus = crate::live::ChangeBus::default();

        let view = collection_view(db.clone(), &bus, LedgerFilter::default());
        let mut rx = view.subscribe();

        view.refresh();
        let initial = rx.recv().await.unwrap();
        assert!(initial.is_empty());

        crate::core::collection::upsert_quantity(&db, "S1", 1, 2, CardColor::Red).await?;
        bus.publish(StoreChange::Collection);

        let updated = timeout(SNAPSHOT_WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].entry.quantity, 2);
        assert_eq!(updated[0].card.as_ref().unwrap().card_name, "Alpha Drake");

        Ok(())
    }

    #[tokio::test]
    async fn test_changing_the_filter_recomputes_under_it() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;
        crate::core::collection::upsert_quantity(&db, "S1", 1, 1, CardColor::Red).await?;
        crate::core::collection::upsert_quantity(&db, "S1", 2, 1, CardColor::Blue).await?;
        let bus = crate::live::ChangeBus::default();

        let view = collection_view(db, &bus, LedgerFilter::default());
        let mut rx = view.subscribe();

        view.set_params(LedgerFilter {
            color: Some(CardColor::Blue),
            sort: SortKey::Name,
            ..LedgerFilter::default()
        });

        let rows = timeout(SNAPSHOT_WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].card.as_ref().unwrap().card_name, "Blue Djinn");

        Ok(())
    }

    #[tokio::test]
    async fn test_deck_view_ignores_other_decks() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;
        let mine = crate::core::deck::create_deck(&db, "Aggro".to_string(), CardColor::Red).await?;
        let other = crate::core::deck::create_deck(&db, "Ctrl".to_string(), CardColor::Blue).await?;
        let bus = crate::live::ChangeBus::default();

        let view = deck_view(db.clone(), &bus, mine.id);
        let mut rx = view.subscribe();

        bus.publish(StoreChange::Deck { deck_id: other.id });
        assert!(timeout(SILENCE_WAIT, rx.recv()).await.is_err());

        crate::core::deck::upsert_card(&db, mine.id, "S1", 1, 3).await?;
        bus.publish(StoreChange::Deck { deck_id: mine.id });

        let rows = timeout(SNAPSHOT_WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry.quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_trade_view_reacts_to_wishlist_changes() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;
        let snapshot = crate::core::external::create_collection(
            &db,
            "Sam".to_string(),
            vec![external_entry("S1", 1, 4, None)],
        )
        .await?;
        let bus = crate::live::ChangeBus::default();

        let view = they_have_you_want_view(db.clone(), &bus, snapshot.id);
        let mut rx = view.subscribe();

        view.refresh();
        let initial = rx.recv().await.unwrap();
        assert!(initial.is_empty());

        // Wanting the card the snapshot offers turns it into a match
        crate::core::wishlist::upsert_quantity(&db, "S1", 1, 2).await?;
        bus.publish(StoreChange::Wishlist);

        let rows = timeout(SNAPSHOT_WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].card_name, "Alpha Drake");
        assert_eq!(rows[0].partner_quantity, 4);
        assert_eq!(rows[0].user_quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_external_view_scoped_to_its_snapshot() -> Result<()> {
        let db = setup_test_db().await?;
        seed_standard_catalog(&db).await?;
        let first = crate::core::external::create_wishlist(
            &db,
            "Alex".to_string(),
            vec![external_entry("S1", 2, 1, None)],
        )
        .await?;
        let bus = crate::live::ChangeBus::default();

        let view = external_wishlist_view(db, &bus, first.id);
        let mut rx = view.subscribe();

        bus.publish(StoreChange::ExternalWishlist { id: first.id + 1 });
        assert!(timeout(SILENCE_WAIT, rx.recv()).await.is_err());

        bus.publish(StoreChange::ExternalWishlist { id: first.id });
        let rows = timeout(SNAPSHOT_WAIT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].card.as_ref().unwrap().card_name, "Blue Djinn");

        Ok(())
    }
}
