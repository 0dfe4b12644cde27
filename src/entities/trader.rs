//! Trader entity - A counterparty on market receipts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Trader database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "traders")]
pub struct Model {
    /// Unique identifier for the trader
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Trader name as it appears on receipts
    pub name: String,
}

/// Defines relationships between Trader and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One trader appears on many receipts
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
