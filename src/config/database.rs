//! Database configuration module for the ledger service.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary
//! tables based on the entity definitions. The module uses `SeaORM`'s
//! `Schema::create_table_from_entity` method to automatically generate SQL statements
//! from the entity models, ensuring that the database schema matches the Rust struct
//! definitions without requiring manual SQL.

use crate::entities::{
    Checkpost, Commodity, Committee, CommitteeMonthlyAnalytics, Receipt, Target, Trader,
    TraderMonthlyAnalytics, TraderOverallAnalytics,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/amc_ledger.sqlite?mode=rwc".to_string());

    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from
/// entity definitions.
///
/// Covers the primary tables (committees, checkposts, traders, commodities,
/// receipts, targets) and the three derived analytics roll-up tables.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let committee_table = schema.create_table_from_entity(Committee);
    let checkpost_table = schema.create_table_from_entity(Checkpost);
    let trader_table = schema.create_table_from_entity(Trader);
    let commodity_table = schema.create_table_from_entity(Commodity);
    let receipt_table = schema.create_table_from_entity(Receipt);
    let target_table = schema.create_table_from_entity(Target);
    let committee_monthly_table = schema.create_table_from_entity(CommitteeMonthlyAnalytics);
    let trader_monthly_table = schema.create_table_from_entity(TraderMonthlyAnalytics);
    let trader_overall_table = schema.create_table_from_entity(TraderOverallAnalytics);

    db.execute(builder.build(&committee_table)).await?;
    db.execute(builder.build(&checkpost_table)).await?;
    db.execute(builder.build(&trader_table)).await?;
    db.execute(builder.build(&commodity_table)).await?;
    db.execute(builder.build(&receipt_table)).await?;
    db.execute(builder.build(&target_table)).await?;
    db.execute(builder.build(&committee_monthly_table)).await?;
    db.execute(builder.build(&trader_monthly_table)).await?;
    db.execute(builder.build(&trader_overall_table)).await?;

    Ok(())
}
