//! Deck entity - a named grouping of cards.
//!
//! Decks are multisets of cards stored in `deck_cards`; deleting a deck
//! deletes its cards in the same transaction.

use super::color::CardColor;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deck database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "decks")]
pub struct Model {
    /// Unique identifier for the deck
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Human-readable deck name
    pub name: String,
    /// Color the deck is tagged with for display
    pub color_tag: CardColor,
}

/// Defines relationships between Deck and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One deck has many deck cards
    #[sea_orm(has_many = "super::deck_card::Entity")]
    DeckCards,
}

impl Related<super::deck_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeckCards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
