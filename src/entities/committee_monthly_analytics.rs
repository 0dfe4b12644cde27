//! Committee monthly analytics entity - Derived per-month roll-up of receipts.
//!
//! One row per (committee, year, month). Rows are recomputed from the
//! receipts table whenever a receipt is created or cancelled; target figures
//! are copied in from the targets table so the dashboard overview reads a
//! single row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Committee monthly analytics database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "committee_monthly_analytics")]
pub struct Model {
    /// Unique identifier for the roll-up row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Committee the row aggregates
    pub committee_id: i64,
    /// Calendar year of the aggregation window
    pub year: i32,
    /// Calendar month of the aggregation window (1-12)
    pub month: i32,
    /// Sum of market fees collected in the month
    pub total_market_fees: f64,
    /// Sum of trade value across all receipt natures
    pub total_value: f64,
    /// Sum of traded quantity
    pub total_quantity: f64,
    /// Number of non-cancelled receipts in the month
    pub receipt_count: i64,
    /// Distinct traders appearing on the month's receipts
    pub unique_traders: i64,
    /// Distinct commodities appearing on the month's receipts
    pub unique_commodities: i64,
    /// Committee-wide market-fee target for the month, if one is set
    pub market_fee_target: f64,
    /// Committee-wide trade-value target for the month, if one is set
    pub total_value_target: f64,
}

/// Defines relationships between the roll-up and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each roll-up row belongs to one committee
    #[sea_orm(
        belongs_to = "super::committee::Entity",
        from = "Column::CommitteeId",
        to = "super::committee::Column::Id"
    )]
    Committee,
}

impl Related<super::committee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Committee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
