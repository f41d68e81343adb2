//! In-memory store adapters for tests and development.
//!
//! The whole ledger state lives behind one mutex, so `commit_mutation` is a
//! single critical section: the version check, the account save, and the
//! transaction insert are observed together or not at all.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Account, ChangeLog, Transaction};

use super::{AuditStore, LedgerStore, StoreError};

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<String, Account>,
    transactions: Vec<Transaction>,
}

/// In-memory ledger store.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: Mutex<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded transactions, in insertion order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().unwrap().transactions.clone()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find_account(&self, account_number: &str) -> Result<Option<Account>, StoreError> {
        let state = self.inner.lock().unwrap();
        Ok(state.accounts.get(account_number).cloned())
    }

    async fn insert_account(&self, account: &Account) -> Result<Account, StoreError> {
        let mut state = self.inner.lock().unwrap();
        if state.accounts.contains_key(&account.account_number) {
            return Err(StoreError::DuplicateAccount(account.account_number.clone()));
        }
        state
            .accounts
            .insert(account.account_number.clone(), account.clone());
        Ok(account.clone())
    }

    async fn commit_mutation(
        &self,
        account: &Account,
        expected_version: i64,
        transaction: &Transaction,
    ) -> Result<Account, StoreError> {
        let mut state = self.inner.lock().unwrap();

        let current = state
            .accounts
            .get(&account.account_number)
            .ok_or_else(|| StoreError::AccountNotFound(account.account_number.clone()))?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                account_number: account.account_number.clone(),
                expected: expected_version,
            });
        }

        let mut committed = account.clone();
        committed.version = expected_version + 1;
        committed.updated_at = Utc::now();

        state
            .accounts
            .insert(committed.account_number.clone(), committed.clone());
        state.transactions.push(transaction.clone());

        Ok(committed)
    }
}

/// In-memory audit store.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    entries: Mutex<Vec<ChangeLog>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded audit rows, in insertion order.
    pub fn entries(&self) -> Vec<ChangeLog> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn insert_change_log(&self, entry: &ChangeLog) -> Result<(), StoreError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionType;
    use rust_decimal::Decimal;

    fn seeded_store() -> InMemoryLedgerStore {
        let store = InMemoryLedgerStore::new();
        let account = Account::new("123".to_string(), "Alice".to_string(), Decimal::ZERO);
        store
            .inner
            .lock()
            .unwrap()
            .accounts
            .insert("123".to_string(), account);
        store
    }

    #[tokio::test]
    async fn test_insert_account_rejects_duplicate() {
        let store = seeded_store();
        let dup = Account::new("123".to_string(), "Mallory".to_string(), Decimal::ZERO);

        let result = store.insert_account(&dup).await;
        assert!(matches!(result, Err(StoreError::DuplicateAccount(_))));
    }

    #[tokio::test]
    async fn test_commit_mutation_increments_version() {
        let store = seeded_store();
        let mut account = store.find_account("123").await.unwrap().unwrap();
        account.balance = Decimal::new(100, 0);
        let tx = Transaction::new(
            "123".to_string(),
            TransactionType::Deposit,
            Decimal::new(100, 0),
        );

        let committed = store.commit_mutation(&account, 0, &tx).await.unwrap();

        assert_eq!(committed.version, 1);
        assert_eq!(committed.balance, Decimal::new(100, 0));
        assert_eq!(store.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_mutation_stale_version_leaves_no_row() {
        let store = seeded_store();
        let mut account = store.find_account("123").await.unwrap().unwrap();
        account.balance = Decimal::new(100, 0);
        let tx = Transaction::new(
            "123".to_string(),
            TransactionType::Deposit,
            Decimal::new(100, 0),
        );

        store.commit_mutation(&account, 0, &tx).await.unwrap();

        // Same snapshot again: version 0 is now stale.
        let tx2 = Transaction::new(
            "123".to_string(),
            TransactionType::Deposit,
            Decimal::new(100, 0),
        );
        let result = store.commit_mutation(&account, 0, &tx2).await;

        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
        assert_eq!(store.transactions().len(), 1);
        let stored = store.find_account("123").await.unwrap().unwrap();
        assert_eq!(stored.balance, Decimal::new(100, 0));
    }
}
