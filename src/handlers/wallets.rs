//! Wallet HTTP handlers.
//!
//! - POST /api/v1/wallet - Deposit into or withdraw from a wallet
//! - GET /api/v1/wallets/{id} - Get a wallet's balance (trailing slash accepted)

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::wallet::{BalanceResponse, OperationRequest},
    services::wallet_service::WalletService,
};

/// Apply a deposit or withdrawal.
///
/// # Request Body
///
/// ```json
/// {
///   "walletId": "550e8400-e29b-41d4-a716-446655440000",
///   "operationType": "DEPOSIT",
///   "amount": 1000
/// }
/// ```
///
/// # Response
///
/// - **200 OK**: `{"walletId": "...", "balance": 1000}` with the new balance
/// - **400**: Malformed JSON, bad wallet id, non-positive amount, unknown operation type
/// - **404**: Withdrawal from a wallet that does not exist
/// - **409**: Insufficient funds
/// - **500 / 503**: Storage failure or deadline exceeded
pub async fn post_operation(
    State(service): State<WalletService>,
    payload: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<Json<BalanceResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let wallet_id = request.wallet_id;
    let balance = service.apply_operation(request).await?;

    Ok(Json(BalanceResponse { wallet_id, balance }))
}

/// Get the current balance of a wallet.
///
/// # Response
///
/// - **200 OK**: `{"walletId": "...", "balance": 500}`
/// - **400**: Path segment is not a UUID
/// - **404**: Wallet does not exist
pub async fn get_balance(
    State(service): State<WalletService>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BalanceResponse>, AppError> {
    let Path(wallet_id) = path.map_err(|_| AppError::validation("Invalid wallet id"))?;

    let balance = service.get_balance(wallet_id).await?;

    Ok(Json(BalanceResponse { wallet_id, balance }))
}

/// `GET /api/v1/wallets/` without an id is a malformed request, not an unknown route.
pub async fn missing_wallet_id() -> AppError {
    AppError::validation("Wallet id required")
}
