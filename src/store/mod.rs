//! Store module
//!
//! Repository interfaces over the ledger and audit stores, plus their
//! Postgres and in-memory implementations. The ledger and audit stores are
//! independent: nothing ties a ChangeLog row back to the Transaction it
//! shadows.

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::{InMemoryAuditStore, InMemoryLedgerStore};
pub use postgres::{PgAuditStore, PgLedgerStore};

use async_trait::async_trait;

use crate::domain::{Account, ChangeLog, Transaction};

/// Durable keyed storage for Account and Transaction records.
///
/// `commit_mutation` is the single atomic unit of the ledger: the versioned
/// account save and the transaction insert commit together or not at all.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Look up an account by its number.
    async fn find_account(&self, account_number: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a brand-new account. Fails with `StoreError::DuplicateAccount`
    /// if the number is already taken.
    async fn insert_account(&self, account: &Account) -> Result<Account, StoreError>;

    /// Atomically persist a balance mutation: save `account` if the stored
    /// version still equals `expected_version` (incrementing it), and insert
    /// the transaction record in the same unit. A stale version fails the
    /// whole unit with `StoreError::VersionConflict` and leaves no partial
    /// state.
    async fn commit_mutation(
        &self,
        account: &Account,
        expected_version: i64,
        transaction: &Transaction,
    ) -> Result<Account, StoreError>;
}

/// Durable storage for audit ChangeLog records.
///
/// No uniqueness or idempotence constraint; duplicate rows are acceptable.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn insert_change_log(&self, entry: &ChangeLog) -> Result<(), StoreError>;
}
