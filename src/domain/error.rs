//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

/// Business rule violations raised by ledger operations.
///
/// Every variant aborts the enclosing unit of work with no partial effect.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// Blank account number or non-positive amount
    #[error("Invalid account number or amount")]
    InvalidRequest,

    /// No account matches the given number
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Withdrawal over the configured ceiling
    #[error("Withdrawal amount exceeds the limit of {limit}")]
    WithdrawalLimitExceeded { limit: Decimal },

    /// Withdrawal over the current balance
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    /// Duplicate account number on creation
    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    /// Stale version on write (optimistic locking)
    #[error("Version conflict for account {account_number}: expected version {expected}")]
    VersionConflict {
        account_number: String,
        expected: i64,
    },
}

impl LedgerError {
    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest
                | Self::WithdrawalLimitExceeded { .. }
                | Self::InsufficientBalance { .. }
                | Self::AccountNotFound(_)
        )
    }

    /// Check if this is a conflict error (retry may help)
    pub fn is_conflict_error(&self) -> bool {
        matches!(
            self,
            Self::VersionConflict { .. } | Self::AccountAlreadyExists(_)
        )
    }
}
