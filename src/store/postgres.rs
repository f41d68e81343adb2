//! Postgres store adapters
//!
//! sqlx-backed implementations of the ledger and audit store interfaces.
//! `commit_mutation` runs inside a scoped transaction: it commits on success
//! and rolls back on every early-return path when the handle drops.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::{Account, ChangeLog, Transaction};

use super::{AuditStore, LedgerStore, StoreError};

/// Unique-violation code raised on a duplicate account number.
const UNIQUE_VIOLATION: &str = "23505";

type AccountRow = (String, String, Decimal, i64, DateTime<Utc>, DateTime<Utc>);

fn account_from_row(row: AccountRow) -> Account {
    let (account_number, name, balance, version, created_at, updated_at) = row;
    Account {
        account_number,
        name,
        balance,
        version,
        created_at,
        updated_at,
    }
}

/// Ledger store backed by the `accounts` and `transactions` tables.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn find_account(&self, account_number: &str) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT account_number, name, balance, version, created_at, updated_at
            FROM accounts
            WHERE account_number = $1
            "#,
        )
        .bind(account_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(account_from_row))
    }

    async fn insert_account(&self, account: &Account) -> Result<Account, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO accounts (account_number, name, balance, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&account.account_number)
        .bind(&account.name)
        .bind(account.balance)
        .bind(account.version)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(account.clone()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(StoreError::DuplicateAccount(account.account_number.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn commit_mutation(
        &self,
        account: &Account,
        expected_version: i64,
        transaction: &Transaction,
    ) -> Result<Account, StoreError> {
        let updated_at = Utc::now();

        let mut tx = self.pool.begin().await?;

        // Versioned check-and-increment. Zero rows means another writer won
        // the race (or the account vanished); either way the unit fails.
        let rows_affected = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = $2, updated_at = $3, version = version + 1
            WHERE account_number = $1 AND version = $4
            "#,
        )
        .bind(&account.account_number)
        .bind(account.balance)
        .bind(updated_at)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::VersionConflict {
                account_number: account.account_number.clone(),
                expected: expected_version,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO transactions (id, account_number, type, amount, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(transaction.id)
        .bind(&transaction.account_number)
        .bind(transaction.kind.as_str())
        .bind(transaction.amount)
        .bind(transaction.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut committed = account.clone();
        committed.version = expected_version + 1;
        committed.updated_at = updated_at;
        Ok(committed)
    }
}

/// Audit store backed by the `change_log` table.
#[derive(Debug, Clone)]
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn insert_change_log(&self, entry: &ChangeLog) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO change_log (id, account_number, transaction_type, amount, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.account_number)
        .bind(&entry.transaction_type)
        .bind(entry.amount)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
