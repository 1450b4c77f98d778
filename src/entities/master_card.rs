//! Master card entity - the static reference catalog of all known cards.
//!
//! Populated once at first run from the bundled dataset and only ever
//! rewritten wholesale by the optional remote catalog sync. Every other table
//! references cards by the composite (`set_code`, `card_number`) key; the
//! reference is deliberately not a schema-level foreign key so that ledgers
//! keep working against an empty or partial catalog.

use super::color::CardColor;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Master catalog database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "master_cards")]
pub struct Model {
    /// Code of the set this card belongs to (e.g., `"AW1"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub set_code: String,
    /// Collector number of the card within its set
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_number: i32,
    /// Printed card name, used for display and free-text search
    pub card_name: String,
    /// Human-readable name of the set
    pub set_name: String,
    /// Card color code
    pub color: CardColor,
}

/// The master catalog is referenced by key only; it owns no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
