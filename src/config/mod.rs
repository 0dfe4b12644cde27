/// Database configuration and connection management
pub mod database;

/// Reference-data (committees, checkposts, commodities) loading from config.toml
pub mod reference;
