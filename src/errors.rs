//! Unified error types for the ledger service.
//!
//! All core functions return [`Result`] with this crate's [`Error`]. The HTTP
//! layer relies on the [`IntoResponse`] implementation to translate the error
//! taxonomy into status codes: validation failures become 400, cross-committee
//! access 403, missing records 404, and everything else a logged 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for all ledger operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading or parsing failed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// A request parameter was missing or malformed
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the invalid input
        message: String,
    },

    /// A monetary amount or quantity was out of range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending value
        amount: f64,
    },

    /// The requested record does not exist
    #[error("{what} not found")]
    NotFound {
        /// Human-readable name of the missing record
        what: String,
    },

    /// A receipt with the same book/receipt number already exists for the committee
    #[error("Duplicate receipt {book_number}/{receipt_number} for committee {committee_id}")]
    DuplicateReceipt {
        /// Book number of the conflicting receipt
        book_number: String,
        /// Receipt number of the conflicting receipt
        receipt_number: String,
        /// Committee the receipt belongs to
        committee_id: i64,
    },

    /// A target already exists for the (year, month, committee, checkpost) combination
    #[error("A target is already set for {month}/{year}")]
    DuplicateTarget {
        /// Target year
        year: i32,
        /// Target month (1-12)
        month: i32,
    },

    /// The requester's committee does not match the record's committee
    #[error("Access to another committee's records is not permitted")]
    Forbidden,

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } | Self::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateReceipt { .. } | Self::DuplicateTarget { .. } => StatusCode::CONFLICT,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::EnvVar(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            // Persistence details stay server-side
            return (status, Json(json!({ "message": "Internal server error" }))).into_response();
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
