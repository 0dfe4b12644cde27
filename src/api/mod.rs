//! HTTP layer - axum router, shared state, and thin handlers that map
//! query/path parameters onto the `core` functions.

pub mod analytics;
pub mod receipts;
pub mod targets;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/analytics", analytics::routes())
        .nest("/api/receipts", receipts::routes())
        .nest("/api/targets", targets::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
