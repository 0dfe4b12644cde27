//! Reference-data configuration loading from config.toml
//!
//! This module provides functionality to load the committee, checkpost, and
//! commodity reference data from a TOML configuration file. The entries
//! defined in config.toml are used to seed the database on first run; seeding
//! is skipped for any table that already has rows.

use crate::{
    entities::{Commodity, Committee, checkpost, commodity, committee},
    errors::{Error, Result},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, serde::Deserialize)]
pub struct ReferenceConfig {
    /// List of committees to seed
    #[serde(default)]
    pub committees: Vec<CommitteeConfig>,
    /// List of commodity names to seed
    #[serde(default)]
    pub commodities: Vec<String>,
}

/// Configuration for a single committee and its checkposts
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CommitteeConfig {
    /// Name of the committee
    pub name: String,
    /// Names of the checkposts under this committee
    #[serde(default)]
    pub checkposts: Vec<String>,
}

/// Loads reference configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ReferenceConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads reference configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<ReferenceConfig> {
    load_config("config.toml")
}

/// Seeds committees, checkposts, and commodities from the reference config.
///
/// Seeding is idempotent per table: committees and their checkposts are only
/// inserted when the committees table is empty, commodities only when the
/// commodities table is empty. Receipts and targets are never seeded.
pub async fn seed_reference_data(
    db: &DatabaseConnection,
    config: &ReferenceConfig,
) -> Result<()> {
    if Committee::find().count(db).await? == 0 {
        for committee_config in &config.committees {
            let inserted = committee::ActiveModel {
                name: Set(committee_config.name.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;

            for checkpost_name in &committee_config.checkposts {
                checkpost::ActiveModel {
                    name: Set(checkpost_name.clone()),
                    committee_id: Set(inserted.id),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }
    }

    if Commodity::find().count(db).await? == 0 {
        for name in &config.commodities {
            commodity::ActiveModel {
                name: Set(name.clone()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    Ok(())
}
