//! PostgreSQL balance store.
//!
//! # Atomicity Guarantees
//!
//! Every mutation runs inside one PostgreSQL transaction that takes
//! `SELECT ... FOR UPDATE` on the wallet row. Concurrent mutations of the same
//! wallet queue on that row lock; other wallets are unaffected. Any early
//! return or dropped future rolls the transaction back.

use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use super::BalanceStore;
use crate::{db::DbPool, error::AppError, models::wallet::OperationType};

/// Balance store backed by the `wallets` table.
#[derive(Debug, Clone)]
pub struct PgBalanceStore {
    pool: DbPool,
}

impl PgBalanceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Read the balance and hold the row lock until the transaction ends.
async fn lock_balance(conn: &mut PgConnection, wallet_id: Uuid) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1 FOR UPDATE")
        .bind(wallet_id)
        .fetch_optional(conn)
        .await
}

/// End a transaction that is returning a business error.
///
/// A failed rollback must not replace the caller's outcome. A connection that
/// cannot roll back is broken, and the server aborts its open transaction.
async fn abandon(tx: sqlx::Transaction<'_, sqlx::Postgres>, wallet_id: Uuid) {
    if let Err(err) = tx.rollback().await {
        tracing::warn!(%wallet_id, error = %err, "rollback failed after rejected operation");
    }
}

/// Insert a new wallet row.
///
/// Returns `None` when another transaction created the same wallet first.
/// The insert waits for that transaction to finish, so a following
/// `lock_balance` sees the committed row.
async fn insert_wallet(
    conn: &mut PgConnection,
    wallet_id: Uuid,
    balance: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO wallets (id, balance)
        VALUES ($1, $2)
        ON CONFLICT (id) DO NOTHING
        RETURNING balance
        "#,
    )
    .bind(wallet_id)
    .bind(balance)
    .fetch_optional(conn)
    .await
}

#[async_trait]
impl BalanceStore for PgBalanceStore {
    async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, AppError> {
        let balance: i64 = sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1")
            .bind(wallet_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::WalletNotFound)?;

        Ok(balance)
    }

    /// # Process
    ///
    /// 1. Start database transaction
    /// 2. Lock the wallet row (`FOR UPDATE`)
    /// 3. Missing row: deposits insert it, withdrawals fail with `WalletNotFound`
    /// 4. Compute the new balance, rejecting overdrafts
    /// 5. Write the balance and commit
    async fn update_balance(
        &self,
        wallet_id: Uuid,
        operation: OperationType,
        amount: i64,
    ) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lost creation races get exactly one more locked read
        let mut creation_raced = false;
        let current = loop {
            match lock_balance(&mut *tx, wallet_id).await? {
                Some(balance) => break balance,
                None if operation == OperationType::Withdraw => {
                    abandon(tx, wallet_id).await;
                    return Err(AppError::WalletNotFound);
                }
                None if creation_raced => {
                    tx.rollback().await?;
                    return Err(AppError::Database(sqlx::Error::RowNotFound));
                }
                None => match insert_wallet(&mut *tx, wallet_id, amount).await? {
                    Some(balance) => {
                        tx.commit().await?;
                        tracing::debug!(%wallet_id, balance, "wallet created");
                        return Ok(balance);
                    }
                    None => {
                        tracing::debug!(%wallet_id, "concurrent wallet creation, retrying locked read");
                        creation_raced = true;
                    }
                },
            }
        };

        let new_balance = match operation.apply(current, amount) {
            Ok(balance) => balance,
            Err(err) => {
                abandon(tx, wallet_id).await;
                tracing::debug!(%wallet_id, %operation, amount, current, "operation rejected");
                return Err(err);
            }
        };

        sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2")
            .bind(new_balance)
            .bind(wallet_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(new_balance)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
