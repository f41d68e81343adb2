//! Ledger records
//!
//! Account is the single shared mutable resource; its `version` field is the
//! optimistic-concurrency token checked by the store on every write.
//! Transaction and ChangeLog are immutable once written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ledger account.
///
/// Keyed by `account_number`. `balance` stays >= 0 through every successful
/// deposit/withdraw; only account creation may seed it negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account number (external key)
    pub account_number: String,

    /// Account holder name
    pub name: String,

    /// Current balance
    pub balance: Decimal,

    /// Optimistic-concurrency version, incremented on every committed write
    pub version: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account record at version zero.
    pub fn new(account_number: String, name: String, balance: Decimal) -> Self {
        let now = Utc::now();
        Self {
            account_number,
            name,
            balance,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Kind of ledger mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable mutation record, written in the same atomic unit as the
/// balance update it mirrors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_number: String,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(account_number: String, kind: TransactionType, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_number,
            kind,
            amount,
            timestamp: Utc::now(),
        }
    }
}

/// Audit record reconstructed from a decoded channel message.
///
/// `account_number` is a plain string with no referential integrity, and
/// `transaction_type` is the free-text label the decoder extracted, not the
/// `TransactionType` enum. Rows may be missing, duplicated, or delayed
/// relative to the Transaction they shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    pub id: Uuid,
    pub account_number: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl ChangeLog {
    /// Build an audit row stamped with the decoder-local time.
    pub fn new(account_number: String, transaction_type: String, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_number,
            transaction_type,
            amount,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_new() {
        let account = Account::new("123".to_string(), "Alice".to_string(), Decimal::ZERO);

        assert_eq!(account.account_number, "123");
        assert_eq!(account.name, "Alice");
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.version, 0);
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn test_transaction_type_as_str() {
        assert_eq!(TransactionType::Deposit.as_str(), "DEPOSIT");
        assert_eq!(TransactionType::Withdrawal.as_str(), "WITHDRAWAL");
    }

    #[test]
    fn test_transaction_new() {
        let tx = Transaction::new(
            "123".to_string(),
            TransactionType::Deposit,
            Decimal::new(100, 0),
        );

        assert_eq!(tx.account_number, "123");
        assert_eq!(tx.kind, TransactionType::Deposit);
        assert_eq!(tx.amount, Decimal::new(100, 0));
    }

    #[test]
    fn test_change_log_keeps_free_text_type() {
        let entry = ChangeLog::new("123".to_string(), "Deposit".to_string(), Decimal::ONE);

        assert_eq!(entry.transaction_type, "Deposit");
        assert_eq!(entry.account_number, "123");
    }
}
