//! Monthly target CRUD endpoints.

use crate::{
    api::AppState,
    core::target::{self, NewTarget, TargetAmounts, TargetFilter},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Routes mounted under `/api/targets`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", put(update).delete(remove))
}

/// Sets a target for a (year, month, committee, checkpost) slot.
async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewTarget>,
) -> Result<Json<Value>> {
    let model = target::set_target(&state.db, new).await?;
    Ok(Json(json!({ "data": model })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    committee_id: Option<String>,
    year: Option<String>,
    month: Option<String>,
}

fn parse_number<T: std::str::FromStr>(raw: Option<&str>, label: &str) -> Result<Option<T>> {
    raw.map(|value| {
        value.parse::<T>().map_err(|_| Error::Validation {
            message: format!("Invalid {label}: {value}"),
        })
    })
    .transpose()
}

/// Lists targets, optionally filtered by committee, year, and month.
async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Result<Json<Value>> {
    let filter = TargetFilter {
        committee_id: parse_number(query.committee_id.as_deref(), "committeeId")?,
        year: parse_number(query.year.as_deref(), "year")?,
        month: parse_number(query.month.as_deref(), "month")?,
    };
    let targets = target::list_targets(&state.db, filter).await?;
    Ok(Json(json!({ "data": targets })))
}

/// Replaces the amounts of an existing target.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(amounts): Json<TargetAmounts>,
) -> Result<Json<Value>> {
    let model = target::update_target(&state.db, id, amounts).await?;
    Ok(Json(json!({ "data": model })))
}

/// Deletes a target.
async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    target::delete_target(&state.db, id).await?;
    Ok(Json(json!({ "message": "Target deleted" })))
}
