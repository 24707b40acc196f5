//! In-memory balance store used by tests.
//!
//! Each wallet identifier owns a slot with its own async mutex, so mutations
//! of one wallet serialize while different wallets proceed in parallel.
//! Reads load the last committed balance without taking that mutex.

use std::sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::BalanceStore;
use crate::{error::AppError, models::wallet::OperationType};

/// Committed balance of a slot whose wallet has never been funded.
const UNFUNDED: i64 = -1;

#[derive(Debug)]
struct Slot {
    /// Held for the whole mutation, like a row lock.
    lock: Mutex<()>,
    balance: AtomicI64,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            lock: Mutex::new(()),
            balance: AtomicI64::new(UNFUNDED),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBalanceStore {
    wallets: Arc<DashMap<Uuid, Arc<Slot>>>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing slot, without creating one.
    fn slot(&self, wallet_id: Uuid) -> Option<Arc<Slot>> {
        // Clone the Arc out so the shard guard is released before awaiting
        self.wallets.get(&wallet_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Number of funded wallets.
    pub fn wallet_count(&self) -> usize {
        self.wallets
            .iter()
            .filter(|entry| entry.value().balance.load(Ordering::Acquire) != UNFUNDED)
            .count()
    }
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, AppError> {
        let slot = self.slot(wallet_id).ok_or(AppError::WalletNotFound)?;
        match slot.balance.load(Ordering::Acquire) {
            UNFUNDED => Err(AppError::WalletNotFound),
            balance => Ok(balance),
        }
    }

    async fn update_balance(
        &self,
        wallet_id: Uuid,
        operation: OperationType,
        amount: i64,
    ) -> Result<i64, AppError> {
        let slot = match operation {
            OperationType::Deposit => Arc::clone(self.wallets.entry(wallet_id).or_default().value()),
            OperationType::Withdraw => self.slot(wallet_id).ok_or(AppError::WalletNotFound)?,
        };

        let _guard = slot.lock.lock().await;
        let new_balance = match slot.balance.load(Ordering::Acquire) {
            UNFUNDED if operation == OperationType::Deposit => amount,
            UNFUNDED => return Err(AppError::WalletNotFound),
            current => operation.apply(current, amount)?,
        };

        // Yield while holding the lock so concurrent callers really contend
        tokio::task::yield_now().await;
        slot.balance.store(new_balance, Ordering::Release);

        Ok(new_balance)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_deposit_creates_wallet() {
        let store = MemoryBalanceStore::new();
        let wallet_id = Uuid::new_v4();

        assert!(matches!(
            store.get_balance(wallet_id).await,
            Err(AppError::WalletNotFound)
        ));
        let balance = store
            .update_balance(wallet_id, OperationType::Deposit, 250)
            .await
            .unwrap();

        assert_eq!(balance, 250);
        assert_eq!(store.get_balance(wallet_id).await.unwrap(), 250);
        assert_eq!(store.wallet_count(), 1);
    }

    #[tokio::test]
    async fn withdraw_from_unknown_wallet_creates_nothing() {
        let store = MemoryBalanceStore::new();
        let wallet_id = Uuid::new_v4();

        let err = store
            .update_balance(wallet_id, OperationType::Withdraw, 10)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::WalletNotFound));
        assert_eq!(store.wallet_count(), 0);
        assert!(matches!(
            store.get_balance(wallet_id).await,
            Err(AppError::WalletNotFound)
        ));
    }

    #[tokio::test]
    async fn insufficient_funds_leaves_balance_unchanged() {
        let store = MemoryBalanceStore::new();
        let wallet_id = Uuid::new_v4();

        store
            .update_balance(wallet_id, OperationType::Deposit, 1000)
            .await
            .unwrap();
        assert_eq!(
            store
                .update_balance(wallet_id, OperationType::Withdraw, 500)
                .await
                .unwrap(),
            500
        );

        let err = store
            .update_balance(wallet_id, OperationType::Withdraw, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));
        assert_eq!(store.get_balance(wallet_id).await.unwrap(), 500);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deposits_into_new_wallet_are_not_lost() {
        let store = MemoryBalanceStore::new();
        let wallet_id = Uuid::new_v4();
        const N: i64 = 50;
        const AMOUNT: i64 = 10;

        let handles: Vec<_> = (0..N)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update_balance(wallet_id, OperationType::Deposit, AMOUNT)
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get_balance(wallet_id).await.unwrap(), N * AMOUNT);
        assert_eq!(store.wallet_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mixed_concurrent_operations_keep_balance_non_negative() {
        let store = MemoryBalanceStore::new();
        let wallet_id = Uuid::new_v4();
        store
            .update_balance(wallet_id, OperationType::Deposit, 50)
            .await
            .unwrap();

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let store = store.clone();
                let operation = if i % 2 == 0 {
                    OperationType::Withdraw
                } else {
                    OperationType::Deposit
                };
                tokio::spawn(async move {
                    (operation, store.update_balance(wallet_id, operation, 15).await)
                })
            })
            .collect();

        let (mut deposits, mut withdrawals) = (0, 0);
        for handle in handles {
            match handle.await.unwrap() {
                (operation, Ok(balance)) => {
                    assert!(balance >= 0);
                    match operation {
                        OperationType::Deposit => deposits += 1,
                        OperationType::Withdraw => withdrawals += 1,
                    }
                }
                (OperationType::Withdraw, Err(AppError::InsufficientFunds)) => {}
                (_, Err(other)) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(deposits, 20);
        let final_balance = store.get_balance(wallet_id).await.unwrap();
        assert_eq!(final_balance, 50 + 15 * (deposits - withdrawals));
        assert!(final_balance >= 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn different_wallets_do_not_share_a_lock() {
        let store = MemoryBalanceStore::new();
        let busy = Uuid::new_v4();
        let other = Uuid::new_v4();
        store
            .update_balance(busy, OperationType::Deposit, 1)
            .await
            .unwrap();

        let slot = store.slot(busy).unwrap();
        let _held = slot.lock.lock().await;

        let balance = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            store.update_balance(other, OperationType::Deposit, 5),
        )
        .await
        .expect("other wallet should not wait on the held lock")
        .unwrap();
        assert_eq!(balance, 5);
    }

    #[tokio::test]
    async fn read_does_not_wait_for_an_in_flight_mutation() {
        let store = MemoryBalanceStore::new();
        let wallet_id = Uuid::new_v4();
        store
            .update_balance(wallet_id, OperationType::Deposit, 70)
            .await
            .unwrap();

        let slot = store.slot(wallet_id).unwrap();
        let _held = slot.lock.lock().await;

        let balance = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            store.get_balance(wallet_id),
        )
        .await
        .expect("balance read should not wait on the mutation lock")
        .unwrap();
        assert_eq!(balance, 70);
    }

    #[tokio::test]
    async fn deposit_in_flight_is_not_visible_as_a_wallet() {
        let store = MemoryBalanceStore::new();
        let wallet_id = Uuid::new_v4();

        // A slot exists but nothing has been committed to it yet
        let slot = Arc::clone(store.wallets.entry(wallet_id).or_default().value());
        let _held = slot.lock.lock().await;

        assert!(matches!(
            store.get_balance(wallet_id).await,
            Err(AppError::WalletNotFound)
        ));
        assert_eq!(store.wallet_count(), 0);
    }
}
