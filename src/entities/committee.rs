//! Committee entity - Represents an Agricultural Market Committee (AMC).
//!
//! A committee is the administrative unit that owns receipts, checkposts,
//! and monthly targets. Every receipt in the system belongs to exactly one
//! committee.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Committee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "committees")]
pub struct Model {
    /// Unique identifier for the committee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Official name of the committee (e.g., "Guntur AMC")
    pub name: String,
}

/// Defines relationships between Committee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One committee has many checkposts
    #[sea_orm(has_many = "super::checkpost::Entity")]
    Checkposts,
    /// One committee has many receipts
    #[sea_orm(has_many = "super::receipt::Entity")]
    Receipts,
    /// One committee has many monthly targets
    #[sea_orm(has_many = "super::target::Entity")]
    Targets,
}

impl Related<super::checkpost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checkposts.def()
    }
}

impl Related<super::receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receipts.def()
    }
}

impl Related<super::target::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Targets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
