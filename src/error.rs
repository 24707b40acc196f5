//! Error types and HTTP error response handling.
//!
//! Every failure of a wallet operation is one of four kinds: bad input, a
//! missing wallet, insufficient funds, or a storage fault. The storage kind has
//! two variants so a deadline can be told apart from a database error in logs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request input is malformed: non-positive amount, unknown operation
    /// type, bad JSON or a non-UUID wallet identifier.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    Validation(String),

    /// Wallet does not exist. Raised by balance reads and by withdrawals
    /// against a wallet that was never funded.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Wallet not found")]
    WalletNotFound,

    /// Withdrawal amount exceeds the current balance. The balance is left unchanged.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Database operation failed (connection, query, commit).
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The operation did not finish before its deadline. Any open database
    /// transaction was rolled back.
    ///
    /// Returns HTTP 503 Service Unavailable.
    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

impl AppError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// True for failures caused by the storage layer rather than by the request.
    pub fn is_storage(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::DeadlineExceeded)
    }
}

/// Convert AppError into an HTTP response.
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "insufficient_funds",
///     "message": "Insufficient funds"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Storage details are logged here and never sent to the client
        if self.is_storage() {
            tracing::error!(error = %self, "wallet operation failed in storage");
        }

        let (status, code, message) = match self {
            AppError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            AppError::WalletNotFound => {
                (StatusCode::NOT_FOUND, "wallet_not_found", self.to_string())
            }
            AppError::InsufficientFunds => {
                (StatusCode::CONFLICT, "insufficient_funds", self.to_string())
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_error",
                "An internal error occurred".to_string(),
            ),
            AppError::DeadlineExceeded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "deadline_exceeded",
                self.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
