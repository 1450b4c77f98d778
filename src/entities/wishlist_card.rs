//! Wishlist card entity - the user's desired-quantity ledger.
//!
//! Same key shape and zero-deletion invariant as the ownership ledger, but
//! carries no price or notes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wishlist ledger database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wishlist_cards")]
pub struct Model {
    /// Set code part of the card key
    #[sea_orm(primary_key, auto_increment = false)]
    pub set_code: String,
    /// Card number part of the card key
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_number: i32,
    /// Wanted quantity; always positive for persisted rows
    pub quantity: i32,
}

/// Wishlist rows reference the catalog by key only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
