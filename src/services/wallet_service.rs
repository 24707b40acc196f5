//! Wallet service - validation and dispatch for wallet operations.
//!
//! The service rejects malformed requests before any storage access and
//! bounds every store call with the configured deadline. Store results and
//! errors are passed through unchanged; nothing is retried here.

use std::{future::Future, sync::Arc, time::Duration};

use uuid::Uuid;

use crate::{
    error::AppError,
    models::wallet::{OperationRequest, OperationType},
    store::BalanceStore,
};

/// Entry point for wallet reads and mutations.
///
/// Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct WalletService {
    store: Arc<dyn BalanceStore>,
    timeout: Duration,
}

impl WalletService {
    pub fn new(store: Arc<dyn BalanceStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Validate and apply a deposit or withdrawal, returning the new balance.
    ///
    /// # Errors
    ///
    /// - `Validation`: amount is zero or negative, or the operation type is not
    ///   exactly `DEPOSIT` or `WITHDRAW`
    /// - `WalletNotFound`: withdrawal from a wallet that does not exist
    /// - `InsufficientFunds`: withdrawal larger than the balance
    /// - `Database` / `DeadlineExceeded`: storage failure, nothing committed
    pub async fn apply_operation(&self, request: OperationRequest) -> Result<i64, AppError> {
        if request.amount <= 0 {
            return Err(AppError::validation("Amount must be positive"));
        }
        let operation: OperationType = request.operation_type.parse()?;

        self.with_deadline(
            self.store
                .update_balance(request.wallet_id, operation, request.amount),
        )
        .await
    }

    /// Current balance of a wallet.
    pub async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, AppError> {
        self.with_deadline(self.store.get_balance(wallet_id)).await
    }

    /// Storage connectivity check for the health endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.with_deadline(self.store.ping()).await
    }

    /// Drop the store future once the deadline passes. Dropping an open
    /// database transaction rolls it back and releases its row lock.
    async fn with_deadline<T>(
        &self,
        operation: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| AppError::DeadlineExceeded)?
    }
}
