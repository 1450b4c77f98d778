//! External wishlist entity - an imported snapshot of a trading partner's
//! wants.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// External wishlist database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "external_wishlists")]
pub struct Model {
    /// Unique identifier for the imported snapshot
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Display name chosen at import time
    pub name: String,
}

/// Defines relationships between ExternalWishlist and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One external wishlist has many card rows
    #[sea_orm(has_many = "super::external_wishlist_card::Entity")]
    Cards,
}

impl Related<super::external_wishlist_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
