use amc_ledger::{
    api::{self, AppState},
    config::{database, reference},
    errors::Result,
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Connect to the database and create missing tables
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 4. Seed reference data (committees, checkposts, commodities)
    let reference_config = reference::load_default_config()
        .inspect_err(|e| error!("Failed to load reference config: {e}"))?;
    reference::seed_reference_data(&db, &reference_config)
        .await
        .inspect(|_| info!("Reference data seeded."))
        .inspect_err(|e| error!("Failed to seed reference data: {e}"))?;

    // 5. Serve the API
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {bind_addr}: {e}"))?;
    info!("Listening on {bind_addr}");

    axum::serve(listener, api::router(AppState { db: std::sync::Arc::new(db) })).await?;

    Ok(())
}
