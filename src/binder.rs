//! Store facade - the application's single handle on the card store.
//!
//! A [`Binder`] owns the database connection and the change bus. Mutating
//! methods delegate to the core operations and publish the matching
//! [`StoreChange`] once the write has committed; read methods delegate
//! directly; view methods hand out [`LiveQuery`] handles bound to the bus.
//! Nothing can query the store before [`Binder::open`] has finished
//! creating tables and seeding the catalog, so readers never observe a
//! half-initialized store.

use sea_orm::DatabaseConnection;
use std::io::{Read, Write};
use tracing::{debug, info, warn};

use crate::config::{database, settings::AppConfig};
use crate::core::collection::{self, CollectionRow};
use crate::core::deck::{self, DeckRow};
use crate::core::external::{self, ExternalCollectionRow, ExternalWishlistRow};
use crate::core::filter::LedgerFilter;
use crate::core::trade::{self, TradeRow};
use crate::core::wishlist::{self, WishlistRow};
use crate::core::{catalog, stats};
use crate::entities::{
    CardColor, CollectionCardModel, DeckModel, ExternalCollectionModel, ExternalWishlistModel,
    MasterCardModel, PricePointModel, ValueSnapshotModel, WishlistCardModel,
};
use crate::errors::Result;
use crate::io::{export, import};
use crate::live::{self, ChangeBus, LiveQuery, StoreChange};
use crate::sync::SyncClient;

/// Handle on the opened card store.
///
/// Cloning is cheap: clones share the same connection pool and change bus,
/// so a clone can be handed to a background task while views stay live.
#[derive(Debug, Clone)]
pub struct Binder {
    db: DatabaseConnection,
    bus: ChangeBus,
}

impl Binder {
    /// Opens the store described by the configuration.
    ///
    /// Connects, creates any missing tables, and seeds the catalog from the
    /// configured dataset. A failed catalog bootstrap is logged and the
    /// store opens with an empty catalog; the ledgers work regardless.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let db = database::create_connection(&config.database_url).await?;
        database::create_tables(&db).await?;

        match catalog::bootstrap(&db, &config.catalog_path).await {
            Ok(report) if report.already_loaded => debug!("catalog already loaded"),
            Ok(report) => info!(
                loaded = report.loaded,
                skipped = report.skipped,
                "catalog bootstrapped"
            ),
            Err(error) => {
                warn!(%error, "catalog bootstrap failed, continuing with an empty catalog");
            }
        }

        Ok(Self {
            db,
            bus: ChangeBus::default(),
        })
    }

    /// Opens a fresh in-memory store with no catalog. The standard setup
    /// for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let db = database::create_connection("sqlite::memory:").await?;
        database::create_tables(&db).await?;
        Ok(Self {
            db,
            bus: ChangeBus::default(),
        })
    }

    /// The underlying database connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The change bus mutations publish on.
    #[must_use]
    pub const fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    // --- ownership ledger ---

    /// Adds a signed quantity delta to an ownership row and publishes the
    /// change. See [`collection::upsert_quantity`].
    pub async fn upsert_collection_quantity(
        &self,
        set_code: &str,
        card_number: i32,
        delta: i32,
        color: CardColor,
    ) -> Result<Option<CollectionCardModel>> {
        let row = collection::upsert_quantity(&self.db, set_code, card_number, delta, color).await?;
        self.bus.publish(StoreChange::Collection);
        Ok(row)
    }

    /// Adds copies of a cataloged card to the ownership ledger and publishes
    /// the change.
    ///
    /// The manual-entry path: non-positive deltas and keys the catalog does
    /// not know are rejected before anything is written. See
    /// [`collection::add_from_catalog`].
    pub async fn add_collection_card_from_catalog(
        &self,
        set_code: &str,
        card_number: i32,
        delta: i32,
    ) -> Result<CollectionCardModel> {
        let row = collection::add_from_catalog(&self.db, set_code, card_number, delta).await?;
        self.bus.publish(StoreChange::Collection);
        Ok(row)
    }

    /// Removes an ownership row outright, publishing only when a row was
    /// actually removed.
    pub async fn remove_collection_entry(&self, set_code: &str, card_number: i32) -> Result<bool> {
        let removed = collection::remove_entry(&self.db, set_code, card_number).await?;
        if removed {
            self.bus.publish(StoreChange::Collection);
        }
        Ok(removed)
    }

    /// Sets or clears the unit price of an ownership row.
    pub async fn set_collection_price(
        &self,
        set_code: &str,
        card_number: i32,
        price: Option<f64>,
    ) -> Result<CollectionCardModel> {
        let row = collection::set_price(&self.db, set_code, card_number, price).await?;
        self.bus.publish(StoreChange::Collection);
        Ok(row)
    }

    /// Sets or clears the note fields of an ownership row.
    pub async fn set_collection_notes(
        &self,
        set_code: &str,
        card_number: i32,
        personal_notes: Option<String>,
        general_notes: Option<String>,
    ) -> Result<CollectionCardModel> {
        let row =
            collection::set_notes(&self.db, set_code, card_number, personal_notes, general_notes)
                .await?;
        self.bus.publish(StoreChange::Collection);
        Ok(row)
    }

    /// Point read of one ownership row.
    pub async fn collection_entry(
        &self,
        set_code: &str,
        card_number: i32,
    ) -> Result<Option<CollectionCardModel>> {
        collection::get_entry(&self.db, set_code, card_number).await
    }

    /// Filtered, catalog-joined listing of the ownership ledger.
    pub async fn collection_rows(&self, filter: &LedgerFilter) -> Result<Vec<CollectionRow>> {
        collection::filtered_rows(&self.db, filter).await
    }

    /// Writes the ownership ledger as CSV, returning the row count.
    pub async fn export_collection<W: Write>(&self, writer: W) -> Result<usize> {
        export::export_collection(&self.db, writer).await
    }

    /// Replaces the ownership ledger with a parsed CSV file and publishes
    /// the change. See [`import::import_collection`].
    pub async fn import_collection<R: Read>(&self, reader: R) -> Result<usize> {
        let applied = import::import_collection(&self.db, reader).await?;
        self.bus.publish(StoreChange::Collection);
        Ok(applied)
    }

    // --- wishlist ledger ---

    /// Adds a signed quantity delta to a wishlist row and publishes the
    /// change.
    pub async fn upsert_wishlist_quantity(
        &self,
        set_code: &str,
        card_number: i32,
        delta: i32,
    ) -> Result<Option<WishlistCardModel>> {
        let row = wishlist::upsert_quantity(&self.db, set_code, card_number, delta).await?;
        self.bus.publish(StoreChange::Wishlist);
        Ok(row)
    }

    /// Removes a wishlist row outright, publishing only when a row was
    /// actually removed.
    pub async fn remove_wishlist_entry(&self, set_code: &str, card_number: i32) -> Result<bool> {
        let removed = wishlist::remove_entry(&self.db, set_code, card_number).await?;
        if removed {
            self.bus.publish(StoreChange::Wishlist);
        }
        Ok(removed)
    }

    /// Point read of one wishlist row.
    pub async fn wishlist_entry(
        &self,
        set_code: &str,
        card_number: i32,
    ) -> Result<Option<WishlistCardModel>> {
        wishlist::get_entry(&self.db, set_code, card_number).await
    }

    /// Filtered, catalog-joined listing of the wishlist.
    pub async fn wishlist_rows(&self, filter: &LedgerFilter) -> Result<Vec<WishlistRow>> {
        wishlist::filtered_rows(&self.db, filter).await
    }

    // --- decks ---

    /// Creates a deck and publishes its change.
    pub async fn create_deck(&self, name: String, color_tag: CardColor) -> Result<DeckModel> {
        let created = deck::create_deck(&self.db, name, color_tag).await?;
        self.bus.publish(StoreChange::Deck {
            deck_id: created.id,
        });
        Ok(created)
    }

    /// Renames or recolors a deck.
    pub async fn update_deck(
        &self,
        deck_id: i32,
        name: String,
        color_tag: CardColor,
    ) -> Result<DeckModel> {
        let updated = deck::update_deck(&self.db, deck_id, name, color_tag).await?;
        self.bus.publish(StoreChange::Deck { deck_id });
        Ok(updated)
    }

    /// Deletes a deck and its cards.
    pub async fn delete_deck(&self, deck_id: i32) -> Result<()> {
        deck::delete_deck(&self.db, deck_id).await?;
        self.bus.publish(StoreChange::Deck { deck_id });
        Ok(())
    }

    /// Adds a signed quantity delta to a deck card.
    pub async fn upsert_deck_card(
        &self,
        deck_id: i32,
        set_code: &str,
        card_number: i32,
        delta: i32,
    ) -> Result<Option<crate::entities::DeckCardModel>> {
        let row = deck::upsert_card(&self.db, deck_id, set_code, card_number, delta).await?;
        self.bus.publish(StoreChange::Deck { deck_id });
        Ok(row)
    }

    /// All decks, name-ordered.
    pub async fn decks(&self) -> Result<Vec<DeckModel>> {
        deck::list_decks(&self.db).await
    }

    /// Point read of one deck.
    pub async fn deck(&self, deck_id: i32) -> Result<Option<DeckModel>> {
        deck::get_deck(&self.db, deck_id).await
    }

    /// Catalog-joined listing of one deck's cards.
    pub async fn deck_rows(&self, deck_id: i32) -> Result<Vec<DeckRow>> {
        deck::deck_rows(&self.db, deck_id).await
    }

    // --- external snapshots ---

    /// Imports an external collection snapshot from CSV and publishes its
    /// creation.
    pub async fn import_external_collection<R: Read>(
        &self,
        name: &str,
        reader: R,
    ) -> Result<ExternalCollectionModel> {
        let created = import::import_external_collection(&self.db, name, reader).await?;
        self.bus
            .publish(StoreChange::ExternalCollection { id: created.id });
        Ok(created)
    }

    /// Imports an external wishlist snapshot from CSV and publishes its
    /// creation.
    pub async fn import_external_wishlist<R: Read>(
        &self,
        name: &str,
        reader: R,
    ) -> Result<ExternalWishlistModel> {
        let created = import::import_external_wishlist(&self.db, name, reader).await?;
        self.bus
            .publish(StoreChange::ExternalWishlist { id: created.id });
        Ok(created)
    }

    /// Deletes an external collection snapshot and its cards.
    pub async fn delete_external_collection(&self, collection_id: i32) -> Result<()> {
        external::delete_collection(&self.db, collection_id).await?;
        self.bus
            .publish(StoreChange::ExternalCollection { id: collection_id });
        Ok(())
    }

    /// Deletes an external wishlist snapshot and its cards.
    pub async fn delete_external_wishlist(&self, wishlist_id: i32) -> Result<()> {
        external::delete_wishlist(&self.db, wishlist_id).await?;
        self.bus
            .publish(StoreChange::ExternalWishlist { id: wishlist_id });
        Ok(())
    }

    /// All external collection snapshots, name-ordered.
    pub async fn external_collections(&self) -> Result<Vec<ExternalCollectionModel>> {
        external::list_collections(&self.db).await
    }

    /// All external wishlist snapshots, name-ordered.
    pub async fn external_wishlists(&self) -> Result<Vec<ExternalWishlistModel>> {
        external::list_wishlists(&self.db).await
    }

    /// Catalog-joined listing of one external collection's cards.
    pub async fn external_collection_rows(
        &self,
        collection_id: i32,
    ) -> Result<Vec<ExternalCollectionRow>> {
        external::collection_rows(&self.db, collection_id).await
    }

    /// Catalog-joined listing of one external wishlist's cards.
    pub async fn external_wishlist_rows(
        &self,
        wishlist_id: i32,
    ) -> Result<Vec<ExternalWishlistRow>> {
        external::wishlist_rows(&self.db, wishlist_id).await
    }

    // --- trade matching ---

    /// Cards an external collection offers that are on the wishlist.
    pub async fn they_have_you_want(&self, external_collection_id: i32) -> Result<Vec<TradeRow>> {
        trade::they_have_you_want(&self.db, external_collection_id).await
    }

    /// Cards the user owns that are on an external wishlist.
    pub async fn you_have_they_want(&self, external_wishlist_id: i32) -> Result<Vec<TradeRow>> {
        trade::you_have_they_want(&self.db, external_wishlist_id).await
    }

    /// Cards in one deck that are on an external wishlist.
    pub async fn deck_has_they_want(
        &self,
        external_wishlist_id: i32,
        deck_id: i32,
    ) -> Result<Vec<TradeRow>> {
        trade::deck_has_they_want(&self.db, external_wishlist_id, deck_id).await
    }

    // --- catalog ---

    /// Number of cards in the catalog.
    pub async fn card_count(&self) -> Result<u64> {
        catalog::card_count(&self.db).await
    }

    /// Point read of a catalog card.
    pub async fn catalog_card(
        &self,
        set_code: &str,
        card_number: i32,
    ) -> Result<Option<MasterCardModel>> {
        catalog::get_card(&self.db, set_code, card_number).await
    }

    /// Name-substring catalog search. The resolution point for card names
    /// recognized outside the store.
    pub async fn search_cards(&self, fragment: &str, limit: u64) -> Result<Vec<MasterCardModel>> {
        catalog::search_by_name(&self.db, fragment, limit).await
    }

    /// Distinct (set code, set name) pairs in the catalog.
    pub async fn list_sets(&self) -> Result<Vec<(String, String)>> {
        catalog::list_sets(&self.db).await
    }

    /// Replaces the catalog from the remote service and publishes the
    /// change. Local ledgers are untouched either way.
    pub async fn sync_catalog(&self, client: &SyncClient) -> Result<usize> {
        let applied = crate::sync::sync_catalog(&self.db, client).await?;
        self.bus.publish(StoreChange::Catalog);
        Ok(applied)
    }

    // --- price statistics ---

    /// Appends a price observation for a card key.
    pub async fn record_price_observation(
        &self,
        set_code: &str,
        card_number: i32,
        price: f64,
    ) -> Result<PricePointModel> {
        let observation =
            stats::record_price_observation(&self.db, set_code, card_number, price).await?;
        self.bus.publish(StoreChange::Prices);
        Ok(observation)
    }

    /// Full price history of a card key, oldest first.
    pub async fn price_history(
        &self,
        set_code: &str,
        card_number: i32,
    ) -> Result<Vec<PricePointModel>> {
        stats::price_history(&self.db, set_code, card_number).await
    }

    /// Most recent price observation for a card key.
    pub async fn latest_price(
        &self,
        set_code: &str,
        card_number: i32,
    ) -> Result<Option<PricePointModel>> {
        stats::latest_price(&self.db, set_code, card_number).await
    }

    /// Total value of the ownership ledger.
    pub async fn collection_value(&self) -> Result<f64> {
        stats::collection_value(&self.db).await
    }

    /// Records the current collection value as a snapshot.
    pub async fn record_value_snapshot(&self) -> Result<ValueSnapshotModel> {
        let snapshot = stats::record_value_snapshot(&self.db).await?;
        self.bus.publish(StoreChange::Prices);
        Ok(snapshot)
    }

    /// All recorded value snapshots, oldest first.
    pub async fn value_history(&self) -> Result<Vec<ValueSnapshotModel>> {
        stats::value_history(&self.db).await
    }

    // --- live views ---

    /// Live filtered listing of the ownership ledger.
    #[must_use]
    pub fn collection_view(
        &self,
        filter: LedgerFilter,
    ) -> LiveQuery<LedgerFilter, Vec<CollectionRow>> {
        live::views::collection_view(self.db.clone(), &self.bus, filter)
    }

    /// Live filtered listing of the wishlist.
    #[must_use]
    pub fn wishlist_view(&self, filter: LedgerFilter) -> LiveQuery<LedgerFilter, Vec<WishlistRow>> {
        live::views::wishlist_view(self.db.clone(), &self.bus, filter)
    }

    /// Live listing of one deck's cards.
    #[must_use]
    pub fn deck_view(&self, deck_id: i32) -> LiveQuery<i32, Vec<DeckRow>> {
        live::views::deck_view(self.db.clone(), &self.bus, deck_id)
    }

    /// Live listing of one external collection's cards.
    #[must_use]
    pub fn external_collection_view(
        &self,
        collection_id: i32,
    ) -> LiveQuery<i32, Vec<ExternalCollectionRow>> {
        live::views::external_collection_view(self.db.clone(), &self.bus, collection_id)
    }

    /// Live listing of one external wishlist's cards.
    #[must_use]
    pub fn external_wishlist_view(
        &self,
        wishlist_id: i32,
    ) -> LiveQuery<i32, Vec<ExternalWishlistRow>> {
        live::views::external_wishlist_view(self.db.clone(), &self.bus, wishlist_id)
    }

    /// Live trade match against an external collection.
    #[must_use]
    pub fn they_have_you_want_view(
        &self,
        external_collection_id: i32,
    ) -> LiveQuery<i32, Vec<TradeRow>> {
        live::views::they_have_you_want_view(self.db.clone(), &self.bus, external_collection_id)
    }

    /// Live trade match against an external wishlist.
    #[must_use]
    pub fn you_have_they_want_view(
        &self,
        external_wishlist_id: i32,
    ) -> LiveQuery<i32, Vec<TradeRow>> {
        live::views::you_have_they_want_view(self.db.clone(), &self.bus, external_wishlist_id)
    }

    /// Live trade match between one deck and an external wishlist.
    #[must_use]
    pub fn deck_has_they_want_view(
        &self,
        external_wishlist_id: i32,
        deck_id: i32,
    ) -> LiveQuery<(i32, i32), Vec<TradeRow>> {
        live::views::deck_has_they_want_view(
            self.db.clone(),
            &self.bus,
            external_wishlist_id,
            deck_id,
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_open_in_memory_starts_empty() -> Result<()> {
        let binder = Binder::open_in_memory().await?;

        assert_eq!(binder.card_count().await?, 0);
        assert!(binder.collection_rows(&LedgerFilter::default()).await?.is_empty());
        assert!(binder.decks().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_publish_their_changes() -> Result<()> {
        let binder = Binder::open_in_memory().await?;
        seed_standard_catalog(binder.db()).await?;
        let mut rx = binder.bus().subscribe();

        binder
            .upsert_collection_quantity("S1", 1, 2, CardColor::Red)
            .await?;
        assert_eq!(rx.recv().await.unwrap(), StoreChange::Collection);

        binder.upsert_wishlist_quantity("S1", 2, 1).await?;
        assert_eq!(rx.recv().await.unwrap(), StoreChange::Wishlist);

        let deck = binder.create_deck("Aggro".to_string(), CardColor::Red).await?;
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreChange::Deck { deck_id: deck.id }
        );

        binder.record_price_observation("S1", 1, 2.5).await?;
        assert_eq!(rx.recv().await.unwrap(), StoreChange::Prices);

        Ok(())
    }

    #[tokio::test]
    async fn test_manual_entry_checks_the_catalog() -> Result<()> {
        let binder = Binder::open_in_memory().await?;
        seed_standard_catalog(binder.db()).await?;
        let mut rx = binder.bus().subscribe();

        let row = binder.add_collection_card_from_catalog("S1", 2, 2).await?;
        assert_eq!(row.quantity, 2);
        assert_eq!(row.color, CardColor::Blue);
        assert_eq!(rx.recv().await.unwrap(), StoreChange::Collection);

        // Rejected entries publish nothing and leave no row behind
        let result = binder.add_collection_card_from_catalog("ZZ", 9, 1).await;
        assert!(matches!(
            result.unwrap_err(),
            crate::errors::Error::CardNotFound { .. }
        ));
        let result = binder.add_collection_card_from_catalog("S1", 1, 0).await;
        assert!(matches!(
            result.unwrap_err(),
            crate::errors::Error::InvalidQuantity { quantity: 0 }
        ));
        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
            "no change should be published for a rejected manual entry"
        );
        assert!(binder.collection_entry("ZZ", 9).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_removing_a_missing_entry_publishes_nothing() -> Result<()> {
        let binder = Binder::open_in_memory().await?;
        let mut rx = binder.bus().subscribe();

        assert!(!binder.remove_collection_entry("S1", 1).await?);
        assert!(
            timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
            "no change should be published for a no-op removal"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_collection_view_reacts_to_facade_mutations() -> Result<()> {
        let binder = Binder::open_in_memory().await?;
        seed_standard_catalog(binder.db()).await?;

        let view = binder.collection_view(LedgerFilter::default());
        let mut rx = view.subscribe();

        binder
            .upsert_collection_quantity("S2", 1, 3, CardColor::Red)
            .await?;

        let rows = timeout(Duration::from_millis(500), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry.quantity, 3);
        assert_eq!(rows[0].card.as_ref().unwrap().card_name, "Crimson Ogre");

        Ok(())
    }

    #[tokio::test]
    async fn test_import_external_feeds_trade_matching() -> Result<()> {
        let binder = Binder::open_in_memory().await?;
        seed_standard_catalog(binder.db()).await?;
        binder.upsert_wishlist_quantity("S1", 1, 2).await?;

        let csv = "setCode,cardNumber,quantity\nS1,1,4\nS2,1,1\n";
        let snapshot = binder
            .import_external_collection("Sam", csv.as_bytes())
            .await?;

        let matches = binder.they_have_you_want(snapshot.id).await?;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].card_name, "Alpha Drake");
        assert_eq!(matches[0].partner_quantity, 4);
        assert_eq!(matches[0].user_quantity, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_value_snapshot_through_the_facade() -> Result<()> {
        let binder = Binder::open_in_memory().await?;
        seed_standard_catalog(binder.db()).await?;

        binder
            .upsert_collection_quantity("S1", 1, 2, CardColor::Red)
            .await?;
        binder.set_collection_price("S1", 1, Some(1.5)).await?;

        let snapshot = binder.record_value_snapshot().await?;
        assert!((snapshot.total_value - 3.0).abs() < f64::EPSILON);
        assert_eq!(binder.value_history().await?.len(), 1);

        Ok(())
    }
}
