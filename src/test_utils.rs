//! Test utilities - Shared helpers for setting up test databases and
//! creating test entities. Only compiled for tests.

#![allow(clippy::unwrap_used)]

use crate::{
    config::database::create_tables,
    core::receipt::{self, NewReceipt},
    entities::{
        CheckpostModel, CommitteeModel, CommodityModel, ReceiptModel, TraderModel, checkpost,
        committee, commodity, trader, trader_monthly_analytics, trader_overall_analytics,
    },
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection};

/// Creates an in-memory SQLite database with all tables created.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for building a `NaiveDate` in tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Inserts a committee with the given name.
pub async fn create_test_committee(db: &DatabaseConnection, name: &str) -> Result<CommitteeModel> {
    Ok(committee::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_string()),
    }
    .insert(db)
    .await?)
}

/// Inserts a checkpost belonging to the given committee.
pub async fn create_test_checkpost(
    db: &DatabaseConnection,
    name: &str,
    committee_id: i64,
) -> Result<CheckpostModel> {
    Ok(checkpost::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_string()),
        committee_id: ActiveValue::Set(committee_id),
    }
    .insert(db)
    .await?)
}

/// Inserts a trader with the given name.
pub async fn create_test_trader(db: &DatabaseConnection, name: &str) -> Result<TraderModel> {
    Ok(trader::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_string()),
    }
    .insert(db)
    .await?)
}

/// Inserts a commodity with the given name.
pub async fn create_test_commodity(db: &DatabaseConnection, name: &str) -> Result<CommodityModel> {
    Ok(commodity::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_string()),
    }
    .insert(db)
    .await?)
}

/// Builds a valid market-fee office receipt with default figures. Tests tweak
/// the returned struct before submitting it.
pub fn new_test_receipt(committee_id: i64, trader_id: i64, receipt_date: NaiveDate) -> NewReceipt {
    NewReceipt {
        receipt_date,
        book_number: "B-1".to_string(),
        receipt_number: "R-1".to_string(),
        trader_id,
        payee_name: "Test Payee".to_string(),
        payee_address: None,
        commodity_id: None,
        quantity: 50.0,
        unit: "kg".to_string(),
        nature_of_receipt: receipt::NATURE_MARKET_FEE.to_string(),
        value: 1000.0,
        fees_paid: 100.0,
        vehicle_number: None,
        invoice_number: None,
        collection_location: receipt::LOCATION_OFFICE.to_string(),
        office_supervisor: Some("Supervisor 1".to_string()),
        checkpost_id: None,
        collection_other_text: None,
        created_by: Some("deo@test".to_string()),
        committee_id,
    }
}

/// Creates a receipt through the full `create_receipt` path, roll-ups
/// included.
pub async fn create_test_receipt(
    db: &DatabaseConnection,
    committee_id: i64,
    trader_id: i64,
    receipt_date: NaiveDate,
) -> Result<ReceiptModel> {
    receipt::create_receipt(db, new_test_receipt(committee_id, trader_id, receipt_date)).await
}

/// Creates a receipt after letting the caller adjust the default input.
pub async fn create_custom_receipt(
    db: &DatabaseConnection,
    committee_id: i64,
    trader_id: i64,
    receipt_date: NaiveDate,
    customize: impl FnOnce(&mut NewReceipt),
) -> Result<ReceiptModel> {
    let mut new = new_test_receipt(committee_id, trader_id, receipt_date);
    customize(&mut new);
    receipt::create_receipt(db, new).await
}

/// Sets up a database with one committee and one trader, the baseline for
/// most receipt and analytics tests.
pub async fn setup_with_committee_and_trader()
-> Result<(DatabaseConnection, CommitteeModel, TraderModel)> {
    let db = setup_test_db().await?;
    let committee = create_test_committee(&db, "AMC Guntur").await?;
    let trader = create_test_trader(&db, "Trader A").await?;
    Ok((db, committee, trader))
}

/// Builds an in-memory trader monthly roll-up row for pure insight tests.
pub fn monthly_row(
    year: i32,
    month: i32,
    value: f64,
    quantity: f64,
    receipts: i64,
) -> trader_monthly_analytics::Model {
    trader_monthly_analytics::Model {
        id: 0,
        trader_id: 1,
        committee_id: 1,
        year,
        month,
        total_value: value,
        total_fees_paid: value * 0.01,
        total_quantity: quantity,
        receipt_count: receipts,
    }
}

/// Builds an in-memory trader overall roll-up row for pure insight tests.
pub fn overall_row(
    first_transaction_date: NaiveDate,
    last_transaction_date: NaiveDate,
) -> trader_overall_analytics::Model {
    trader_overall_analytics::Model {
        id: 0,
        trader_id: 1,
        committee_id: 1,
        total_value: 5000.0,
        total_fees_paid: 50.0,
        total_quantity: 250.0,
        receipt_count: 5,
        first_transaction_date,
        last_transaction_date,
    }
}
