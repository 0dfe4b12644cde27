//! Target entity - A monthly market-fee and trade-value goal.
//!
//! Targets are set by Assistant-Director users for a committee, optionally
//! narrowed to a single checkpost. At most one target may exist per
//! (year, month, committee, checkpost) combination; the check lives in
//! `core::target` rather than in a database constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Target database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "targets")]
pub struct Model {
    /// Unique identifier for the target
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar year the target applies to
    pub year: i32,
    /// Calendar month the target applies to (1-12)
    pub month: i32,
    /// Committee the target is set for
    pub committee_id: i64,
    /// Optional checkpost scope; None means committee-wide
    pub checkpost_id: Option<i64>,
    /// Market-fee collection goal for the month
    pub market_fee_target: f64,
    /// Total trade-value goal for the month
    pub total_value_target: f64,
    /// Identity of the user who set the target
    pub set_by: Option<String>,
    /// When the target was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Target and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each target belongs to one committee
    #[sea_orm(
        belongs_to = "super::committee::Entity",
        from = "Column::CommitteeId",
        to = "super::committee::Column::Id"
    )]
    Committee,
    /// A target may be scoped to one checkpost
    #[sea_orm(
        belongs_to = "super::checkpost::Entity",
        from = "Column::CheckpostId",
        to = "super::checkpost::Column::Id"
    )]
    Checkpost,
}

impl Related<super::committee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Committee.def()
    }
}

impl Related<super::checkpost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checkpost.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
