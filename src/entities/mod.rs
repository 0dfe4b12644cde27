//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod checkpost;
pub mod commodity;
pub mod committee;
pub mod committee_monthly_analytics;
pub mod receipt;
pub mod target;
pub mod trader;
pub mod trader_monthly_analytics;
pub mod trader_overall_analytics;

// Re-export specific types to avoid conflicts
pub use checkpost::{Column as CheckpostColumn, Entity as Checkpost, Model as CheckpostModel};
pub use commodity::{Column as CommodityColumn, Entity as Commodity, Model as CommodityModel};
pub use committee::{Column as CommitteeColumn, Entity as Committee, Model as CommitteeModel};
pub use committee_monthly_analytics::{
    Column as CommitteeMonthlyColumn, Entity as CommitteeMonthlyAnalytics,
    Model as CommitteeMonthlyModel,
};
pub use receipt::{Column as ReceiptColumn, Entity as Receipt, Model as ReceiptModel};
pub use target::{Column as TargetColumn, Entity as Target, Model as TargetModel};
pub use trader::{Column as TraderColumn, Entity as Trader, Model as TraderModel};
pub use trader_monthly_analytics::{
    Column as TraderMonthlyColumn, Entity as TraderMonthlyAnalytics, Model as TraderMonthlyModel,
};
pub use trader_overall_analytics::{
    Column as TraderOverallColumn, Entity as TraderOverallAnalytics, Model as TraderOverallModel,
};
