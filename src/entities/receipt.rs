//! Receipt entity - A single market transaction record.
//!
//! Each receipt carries the book/receipt number pair (unique per committee
//! among non-cancelled rows), the trader and optional commodity involved,
//! the nature of the levy (`"mf"`, `"lf"`, `"uc"`, `"others"`), and where the
//! amount was collected (`"office"`, `"checkpost"`, `"other"`) with a
//! location-specific sub-reference. Receipts are never deleted; cancellation
//! only sets the `cancelled` flag.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Receipt database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipts")]
pub struct Model {
    /// Unique identifier for the receipt
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Date of the transaction being receipted
    pub receipt_date: Date,
    /// Book number printed on the physical receipt book
    pub book_number: String,
    /// Receipt number within the book
    pub receipt_number: String,
    /// Trader the receipt was issued against
    pub trader_id: i64,
    /// Name of the payee
    pub payee_name: String,
    /// Optional address of the payee
    pub payee_address: Option<String>,
    /// Commodity traded, if any (license/user-charge receipts may have none)
    pub commodity_id: Option<i64>,
    /// Quantity traded, expressed in `unit`
    pub quantity: f64,
    /// Unit of the quantity (e.g., "kg", "quintal")
    pub unit: String,
    /// Nature of the levy: `"mf"` (market fee), `"lf"` (license fee),
    /// `"uc"` (user charge), or `"others"`
    pub nature_of_receipt: String,
    /// Monetary value of the traded goods
    pub value: f64,
    /// Fees actually collected on this receipt
    pub fees_paid: f64,
    /// Vehicle number, when goods moved by vehicle
    pub vehicle_number: Option<String>,
    /// Invoice number, when an invoice accompanied the trade
    pub invoice_number: Option<String>,
    /// Where the amount was collected: `"office"`, `"checkpost"`, or `"other"`
    pub collection_location: String,
    /// Supervisor who collected at the office, when location is `"office"`
    pub office_supervisor: Option<String>,
    /// Checkpost where collected, when location is `"checkpost"`
    pub checkpost_id: Option<i64>,
    /// Free-text description, when location is `"other"`
    pub collection_other_text: Option<String>,
    /// Identity of the user who entered the receipt
    pub created_by: Option<String>,
    /// Committee the receipt belongs to
    pub committee_id: i64,
    /// Cancellation flag - cancelled receipts are excluded from all analytics
    pub cancelled: bool,
    /// When the receipt row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Receipt and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each receipt belongs to one committee
    #[sea_orm(
        belongs_to = "super::committee::Entity",
        from = "Column::CommitteeId",
        to = "super::committee::Column::Id"
    )]
    Committee,
    /// Each receipt names one trader
    #[sea_orm(
        belongs_to = "super::trader::Entity",
        from = "Column::TraderId",
        to = "super::trader::Column::Id"
    )]
    Trader,
    /// A receipt may name one commodity
    #[sea_orm(
        belongs_to = "super::commodity::Entity",
        from = "Column::CommodityId",
        to = "super::commodity::Column::Id"
    )]
    Commodity,
    /// A receipt may have been collected at one checkpost
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

impl Related<super::trader::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trader.def()
    }
}

impl Related<super::commodity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Commodity.def()
    }
}

impl Related<super::checkpost::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Checkpost.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
