//! External collection card entity - one card a trading partner owns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// External collection card database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "external_collection_cards")]
pub struct Model {
    /// Id of the external collection this row belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection_id: i32,
    /// Set code part of the card key
    #[sea_orm(primary_key, auto_increment = false)]
    pub set_code: String,
    /// Card number part of the card key
    #[sea_orm(primary_key, auto_increment = false)]
    pub card_number: i32,
    /// Quantity the partner offers
    pub quantity: i32,
    /// Optional asking price from the partner's list
    pub price: Option<f64>,
}

/// Defines relationships between ExternalCollectionCard and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each card row belongs to one external collection
    #[sea_orm(
        belongs_to = "super::external_collection::Entity",
        from = "Column::CollectionId",
        to = "super::external_collection::Column::Id",
        on_delete = "Cascade"
    )]
    Collection,
}

impl Related<super::external_collection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
