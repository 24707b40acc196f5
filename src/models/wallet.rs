//! Wallet data models and API request/response types.
//!
//! Wallets are stored as one `wallets` row (`id UUID`, `balance BIGINT >= 0`)
//! owned by the balance store; this module only holds what crosses its seams:
//! - `OperationType`: The two balance mutations a client may request
//! - `OperationRequest`: Request body for `POST /api/v1/wallet`
//! - `BalanceResponse`: Response body carrying a wallet's balance

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::error::AppError;

/// Balance mutation requested by a client.
///
/// Parsed case-sensitively from `"DEPOSIT"` or `"WITHDRAW"`; no aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Deposit,
    Withdraw,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "DEPOSIT",
            OperationType::Withdraw => "WITHDRAW",
        }
    }

    /// Balance after applying this operation to `current`.
    ///
    /// # Errors
    ///
    /// - `InsufficientFunds` if a withdrawal would make the balance negative
    /// - `Validation` if a deposit would overflow `i64`
    pub fn apply(self, current: i64, amount: i64) -> Result<i64, AppError> {
        match self {
            OperationType::Deposit => current
                .checked_add(amount)
                .ok_or_else(|| AppError::validation("Deposit would overflow the balance")),
            OperationType::Withdraw => {
                if current < amount {
                    return Err(AppError::InsufficientFunds);
                }
                Ok(current - amount)
            }
        }
    }
}

impl FromStr for OperationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(OperationType::Deposit),
            "WITHDRAW" => Ok(OperationType::Withdraw),
            other => Err(AppError::Validation(format!(
                "Invalid operation type: {other}"
            ))),
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to deposit into or withdraw from a wallet.
///
/// # JSON Example
///
/// ```json
/// {
///   "walletId": "550e8400-e29b-41d4-a716-446655440000",
///   "operationType": "DEPOSIT",
///   "amount": 1000
/// }
/// ```
///
/// `operationType` stays a raw string here; the wallet service decides
/// whether it is one of the recognized values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub wallet_id: Uuid,
    pub operation_type: String,
    pub amount: i64,
}

/// Response body for both wallet endpoints.
///
/// ```json
/// {
///   "walletId": "550e8400-e29b-41d4-a716-446655440000",
///   "balance": 500
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub wallet_id: Uuid,
    pub balance: i64,
}
