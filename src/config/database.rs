//! Database configuration module for `BinderBuddy`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{
    CollectionCard, Deck, DeckCard, ExternalCollection, ExternalCollectionCard, ExternalWishlist,
    ExternalWishlistCard, MasterCard, PricePoint, ValueSnapshot, WishlistCard,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/binder_buddy.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database at the given URL.
///
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct definitions.
/// It creates tables for the card catalog, the ownership and wishlist ledgers, decks, external
/// snapshots, and the price history. Existing tables are left alone, so the function is safe to
/// call on every startup against a persistent database file.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    // Use SeaORM's proper table creation using Schema::create_table_from_entity
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(MasterCard),
        schema.create_table_from_entity(CollectionCard),
        schema.create_table_from_entity(WishlistCard),
        schema.create_table_from_entity(Deck),
        schema.create_table_from_entity(DeckCard),
        schema.create_table_from_entity(ExternalCollection),
        schema.create_table_from_entity(ExternalCollectionCard),
        schema.create_table_from_entity(ExternalWishlist),
        schema.create_table_from_entity(ExternalWishlistCard),
        schema.create_table_from_entity(PricePoint),
        schema.create_table_from_entity(ValueSnapshot),
    ];

    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    Ok(())
}
