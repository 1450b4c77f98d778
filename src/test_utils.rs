//! Shared test utilities for `BinderBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and seeding them with a small known catalog.

use crate::{core::external::ExternalEntry, entities, errors::Result};
use sea_orm::{DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a single catalog card.
pub async fn seed_catalog_card(
    db: &DatabaseConnection,
    set_code: &str,
    card_number: i32,
    card_name: &str,
    set_name: &str,
    color: entities::CardColor,
) -> Result<()> {
    let card = entities::master_card::ActiveModel {
        set_code: Set(set_code.to_string()),
        card_number: Set(card_number),
        card_name: Set(card_name.to_string()),
        set_name: Set(set_name.to_string()),
        color: Set(color),
    };
    entities::MasterCard::insert(card).exec(db).await?;
    Ok(())
}

/// Seeds the three-card catalog most tests run against:
///
/// * `S1/1` "Alpha Drake", First Set, red
/// * `S1/2` "Blue Djinn", First Set, blue
/// * `S2/1` "Crimson Ogre", Second Set, red
pub async fn seed_standard_catalog(db: &DatabaseConnection) -> Result<()> {
    use entities::CardColor::{Blue, Red};

    seed_catalog_card(db, "S1", 1, "Alpha Drake", "First Set", Red).await?;
    seed_catalog_card(db, "S1", 2, "Blue Djinn", "First Set", Blue).await?;
    seed_catalog_card(db, "S2", 1, "Crimson Ogre", "Second Set", Red).await?;
    Ok(())
}

/// Builds an [`ExternalEntry`] for snapshot tests.
#[must_use]
pub fn external_entry(
    set_code: &str,
    card_number: i32,
    quantity: i32,
    price: Option<f64>,
) -> ExternalEntry {
    ExternalEntry {
        set_code: set_code.to_string(),
        card_number,
        quantity,
        price,
    }
}
