//! External collection entity - an imported snapshot of a trading partner's
//! holdings.
//!
//! Created wholesale at import time together with its card rows and deleted
//! wholesale when the user removes the import.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// External collection database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "external_collections")]
pub struct Model {
    /// Unique identifier for the imported snapshot
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Display name chosen at import time (usually the partner's name)
    pub name: String,
}

/// Defines relationships between ExternalCollection and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One external collection has many card rows
    #[sea_orm(has_many = "super::external_collection_card::Entity")]
    Cards,
}

impl Related<super::external_collection_card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
