//! Collection card entity - the user's ownership ledger.
//!
//! One row per owned card variant, keyed by (`set_code`, `card_number`).
//! A row only exists while its quantity is positive; decrements that reach
//! zero delete the row in the same atomic unit (see `core::collection`).
//! The color is denormalized from the catalog so that export/import and
//! color filtering keep working when the catalog is empty.

use super::color::CardColor;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ownership ledger database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "collection_cards")]
pub struct Model {
    /// Set code part of the card key
    #[sea_orm(primary_key, auto_increment = false)]
    pub set_code: String,
    /// Card number part of the card key
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_number: i32,
    /// Owned quantity; always positive for persisted rows
    pub quantity: i32,
    /// Optional per-card price used by the value statistics
    pub price: Option<f64>,
    /// Card color, denormalized from the catalog at insert time
    pub color: CardColor,
    /// Free-form notes private to the owner
    pub personal_notes: Option<String>,
    /// Free-form notes intended to be shared (condition, language, ...)
    pub general_notes: Option<String>,
}

/// Collection rows reference the catalog by key only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
