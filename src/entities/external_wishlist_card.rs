//! Card rows belonging to an imported external wishlist.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// External wishlist card database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "external_wishlist_cards")]
pub struct Model {
    /// Wishlist snapshot this row belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub wishlist_id: i32,
    /// Set code of the wanted card
    #[sea_orm(primary_key, auto_increment = false)]
    pub set_code: String,
    /// Collector number of the wanted card within its set
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_number: i32,
    /// How many copies the partner wants
    pub quantity: i32,
}

/// Defines relationships between ExternalWishlistCard and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each card row belongs to exactly one external wishlist
    #[sea_orm(
        belongs_to = "super::external_wishlist::Entity",
        from = "Column::WishlistId",
        to = "super::external_wishlist::Column::Id",
        on_delete = "Cascade"
    )]
    Wishlist,
}

impl Related<super::external_wishlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishlist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
