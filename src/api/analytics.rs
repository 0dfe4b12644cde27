//! Analytics endpoints.
//!
//! Handlers stay thin: parse parameters, pick "today" as the reference date,
//! and delegate to `core`. Numeric-looking query parameters arrive as strings
//! so the parse failures surface as this API's own 400s rather than axum
//! rejections.

use crate::{
    api::AppState,
    core::{commodity_analytics, committee_analytics, overview, trader_analytics},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

/// Routes mounted under `/api/analytics`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/getCommoditiesAnalytics/:committee_id",
            get(commodity_mix),
        )
        .route("/getMfAnalytics", get(district_mf_share))
        .route("/committee/:committee_id", get(committee_report))
        .route("/commodities", get(top_commodities))
        .route("/traders/:committee_id", get(trader_ranking))
        .route("/traders/:committee_id/:trader_id", get(trader_report))
        .route("/overview/:committee_id", get(committee_overview))
}

/// Percentage share of each commodity within one committee's receipts.
async fn commodity_mix(
    State(state): State<AppState>,
    Path(committee_id): Path<i64>,
) -> Result<Json<Value>> {
    let data = committee_analytics::commodity_mix(&state.db, committee_id).await?;
    Ok(Json(json!({ "data": data })))
}

/// Each committee's share of district-wide market fees.
async fn district_mf_share(State(state): State<AppState>) -> Result<Json<Value>> {
    let data = committee_analytics::district_market_fee_share(&state.db).await?;
    Ok(Json(json!({ "data": data })))
}

/// Trailing-12-month market-fee report for one committee.
async fn committee_report(
    State(state): State<AppState>,
    Path(committee_id): Path<i64>,
) -> Result<Json<committee_analytics::CommitteeMarketFeeReport>> {
    let report = committee_analytics::committee_market_fee_report(
        &state.db,
        committee_id,
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(report))
}

/// District-wide top commodities by traded quantity.
async fn top_commodities(State(state): State<AppState>) -> Result<Json<Value>> {
    let top = commodity_analytics::top_commodities(&state.db, Utc::now().date_naive()).await?;
    Ok(Json(json!({ "topCommodities": top })))
}

#[derive(Debug, Deserialize)]
struct TraderQuery {
    year: Option<String>,
    month: Option<String>,
    limit: Option<String>,
}

/// Top traders of a committee, optionally narrowed to a year or month.
async fn trader_ranking(
    State(state): State<AppState>,
    Path(committee_id): Path<i64>,
    Query(query): Query<TraderQuery>,
) -> Result<Json<trader_analytics::TraderRanking>> {
    let filter =
        trader_analytics::parse_period_filter(query.year.as_deref(), query.month.as_deref())?;
    let limit = trader_analytics::parse_limit(query.limit.as_deref())?;
    let ranking = trader_analytics::rank_traders(&state.db, committee_id, filter, limit).await?;
    Ok(Json(ranking))
}

/// Detailed trend report for one trader within a committee.
async fn trader_report(
    State(state): State<AppState>,
    Path((committee_id, trader_id)): Path<(i64, i64)>,
    Query(query): Query<TraderQuery>,
) -> Result<Json<trader_analytics::TraderReport>> {
    let filter =
        trader_analytics::parse_period_filter(query.year.as_deref(), query.month.as_deref())?;
    let report = trader_analytics::trader_report(
        &state.db,
        committee_id,
        trader_id,
        filter,
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(report))
}

/// Current-month dashboard sums for one committee.
async fn committee_overview(
    State(state): State<AppState>,
    Path(committee_id): Path<i64>,
) -> Result<Json<crate::entities::CommitteeMonthlyModel>> {
    let row = overview::committee_overview(&state.db, committee_id, Utc::now().date_naive()).await?;
    Ok(Json(row))
}
