//! Commodity entity - A traded good type referenced by receipts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Commodity database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commodities")]
pub struct Model {
    /// Unique identifier for the commodity
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Commodity name (e.g., "Rice", "Cotton")
    pub name: String,
}

/// Defines relationships between Commodity and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One commodity appears on many receipts
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
