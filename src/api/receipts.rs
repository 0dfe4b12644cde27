//! Receipt endpoints: creation, cancellation, and public verification.

use crate::{
    api::AppState,
    core::receipt::{self, NewReceipt},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Routes mounted under `/api/receipts`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/:id/cancel", post(cancel))
        .route("/verifyReceipt", get(verify))
}

/// Records a new receipt.
async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewReceipt>,
) -> Result<Json<Value>> {
    let model = receipt::create_receipt(&state.db, new).await?;
    Ok(Json(json!({ "data": model })))
}

/// Cancels a receipt; the row is kept with its cancellation flag set.
async fn cancel(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    let model = receipt::cancel_receipt(&state.db, id).await?;
    Ok(Json(json!({ "data": model })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyQuery {
    receipt_number: Option<String>,
    book_number: Option<String>,
    committee_id: Option<String>,
}

/// Looks up non-cancelled receipts by (book, receipt, committee) for the
/// public verification screen.
async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<Value>> {
    let receipt_number = query.receipt_number.ok_or_else(|| Error::Validation {
        message: "receiptNumber is required".to_string(),
    })?;
    let book_number = query.book_number.ok_or_else(|| Error::Validation {
        message: "bookNumber is required".to_string(),
    })?;
    let committee_id = query
        .committee_id
        .as_deref()
        .ok_or_else(|| Error::Validation {
            message: "committeeId is required".to_string(),
        })?
        .parse::<i64>()
        .map_err(|_| Error::Validation {
            message: "committeeId must be a number".to_string(),
        })?;

    let matches =
        receipt::verify_receipts(&state.db, &book_number, &receipt_number, committee_id).await?;
    Ok(Json(json!({ "data": matches })))
}
