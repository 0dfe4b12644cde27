//! Trader overall analytics entity - All-time roll-up per (trader, committee).
//!
//! Unlike the monthly rows, this table keeps a single row per trader and
//! committee with lifetime sums and the first/last transaction dates used by
//! the activity insights.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Trader overall analytics database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trader_overall_analytics")]
pub struct Model {
    /// Unique identifier for the roll-up row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Trader the row aggregates
    pub trader_id: i64,
    /// Committee scope of the aggregation
    pub committee_id: i64,
    /// Lifetime sum of trade value
    pub total_value: f64,
    /// Lifetime sum of fees paid
    pub total_fees_paid: f64,
    /// Lifetime sum of traded quantity
    pub total_quantity: f64,
    /// Lifetime number of non-cancelled receipts
    pub receipt_count: i64,
    /// Date of the trader's earliest receipt with this committee
    pub first_transaction_date: Date,
    /// Date of the trader's most recent receipt with this committee
    pub last_transaction_date: Date,
}

/// Defines relationships between the roll-up and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each roll-up row belongs to one trader
    #[sea_orm(
        belongs_to = "super::trader::Entity",
        from = "Column::TraderId",
        to = "super::trader::Column::Id"
    )]
    Trader,
    /// Each roll-up row is scoped to one committee
    #[sea_orm(
        belongs_to = "super::committee::Entity",
        from = "Column::CommitteeId",
        to = "super::committee::Column::Id"
    )]
    Committee,
}

impl Related<super::trader::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trader.def()
    }
}

impl Related<super::committee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Committee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
