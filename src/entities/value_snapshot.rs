//! Collection value snapshot entity - the total collection value captured
//! at a point in time, for tracking growth over time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Value snapshot database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "value_snapshots")]
pub struct Model {
    /// Unique identifier for the snapshot
    #[sea_orm(primary_key)]
    pub id: i32,
    /// When the snapshot was taken
    pub timestamp: DateTimeUtc,
    /// Sum over owned cards of quantity times unit price at snapshot time
    pub total_value: f64,
}

/// Defines relationships between ValueSnapshot and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
