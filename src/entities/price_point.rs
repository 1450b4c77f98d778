//! Price observation entity - one recorded market price for a card at a
//! point in time. Rows are append-only; history queries order by timestamp.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Price point database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_points")]
pub struct Model {
    /// Unique identifier for the observation
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Set code of the observed card
    pub set_code: String,
    /// Collector number of the observed card within its set
    pub card_number: i32,
    /// Observed market price
    pub price: f64,
    /// When the observation was recorded
    pub timestamp: DateTimeUtc,
}

/// Defines relationships between PricePoint and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
