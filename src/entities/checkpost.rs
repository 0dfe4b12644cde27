//! Checkpost entity - A physical collection point under a committee.
//!
//! Receipts collected at a checkpost reference it through `checkpost_id`;
//! monthly targets may also be scoped to a single checkpost.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Checkpost database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "checkposts")]
pub struct Model {
    /// Unique identifier for the checkpost
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the checkpost (e.g., "Mangalagiri CP")
    pub name: String,
    /// Committee this checkpost belongs to
    pub committee_id: i64,
}

/// Defines relationships between Checkpost and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each checkpost belongs to one committee
    #[sea_orm(
        belongs_to = "super::committee::Entity",
        from = "Column::CommitteeId",
        to = "super::committee::Column::Id"
    )]
    Committee,
    /// One checkpost has many receipts collected at it
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
}

impl Related<super::committee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Committee.def()
    }
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
