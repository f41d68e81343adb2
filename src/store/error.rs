//! Store Errors

/// Errors surfaced by the ledger and audit stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict: the stored version moved on
    #[error("Version conflict for account {account_number}: expected version {expected}")]
    VersionConflict {
        account_number: String,
        expected: i64,
    },

    /// Unique account number already taken
    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    /// Account vanished between read and write
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Check if this error is a concurrency conflict
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_conflict_classification() {
        let err = StoreError::VersionConflict {
            account_number: "123".to_string(),
            expected: 2,
        };
        assert!(err.is_concurrency_conflict());
        assert!(err.to_string().contains("123"));

        let err = StoreError::DuplicateAccount("123".to_string());
        assert!(!err.is_concurrency_conflict());
    }
}
