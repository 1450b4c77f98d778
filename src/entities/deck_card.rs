//! Deck card entity - one card key with a quantity inside a deck.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deck card database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deck_cards")]
pub struct Model {
    /// Id of the deck this row belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub deck_id: i32,
    /// Set code part of the card key
    #[sea_orm(primary_key, auto_increment = false)]
    pub set_code: String,
    /// Card number part of the card key
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_number: i32,
    /// Number of copies of this card in the deck; always positive
    pub quantity: i32,
}

/// Defines relationships between DeckCard and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each deck card belongs to one deck
    #[sea_orm(
        belongs_to = "super::deck::Entity",
        from = "Column::DeckId",
        to = "super::deck::Column::Id",
        on_delete = "Cascade"
    )]
    Deck,
}

impl Related<super::deck::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deck.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
