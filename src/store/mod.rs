//! Balance store - the only writer of wallet balances.
//!
//! The wallet service talks to storage exclusively through [`BalanceStore`].
//! Implementations must serialize mutations per wallet, keep every balance
//! non-negative and create a wallet on its first deposit.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::{error::AppError, models::wallet::OperationType};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Durable wallet balances.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current balance of an existing wallet.
    ///
    /// A point-in-time read that does not take the row lock.
    ///
    /// # Errors
    ///
    /// - `WalletNotFound` if no wallet has this identifier
    /// - `Database` on storage failure
    async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, AppError>;

    /// Apply a deposit or withdrawal under the wallet's exclusive lock and
    /// return the new balance.
    ///
    /// A deposit into an unknown wallet creates it with `balance = amount`.
    ///
    /// # Errors
    ///
    /// - `WalletNotFound` when withdrawing from an unknown wallet
    /// - `InsufficientFunds` when a withdrawal exceeds the balance
    /// - `Database` on storage failure; nothing is committed
    async fn update_balance(
        &self,
        wallet_id: Uuid,
        operation: OperationType,
        amount: i64,
    ) -> Result<i64, AppError>;

    /// Verify that storage is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
