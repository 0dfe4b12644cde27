//! Trader monthly analytics entity - Derived per-month roll-up by trader.
//!
//! One row per (trader, committee, year, month), recomputed on receipt
//! create/cancel. Trader rankings and trend reports read these rows instead
//! of scanning receipts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Trader monthly analytics database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trader_monthly_analytics")]
pub struct Model {
    /// Unique identifier for the roll-up row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Trader the row aggregates
    pub trader_id: i64,
    /// Committee scope of the aggregation
    pub committee_id: i64,
    /// Calendar year of the aggregation window
    pub year: i32,
    /// Calendar month of the aggregation window (1-12)
    pub month: i32,
    /// Sum of trade value on the trader's receipts
    pub total_value: f64,
    /// Sum of fees paid on the trader's receipts
    pub total_fees_paid: f64,
    /// Sum of traded quantity
    pub total_quantity: f64,
    /// Number of non-cancelled receipts
    pub receipt_count: i64,
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
