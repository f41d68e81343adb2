//! Ledger Service
//!
//! Deposit, withdraw, and create-account against the injected stores. Each
//! mutation is one atomic store unit; the audit publish happens strictly
//! after commit and its failure never reaches the caller.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::audit::codec;
use crate::channel::EventChannel;
use crate::config::Config;
use crate::domain::{Account, Amount, LedgerError, Transaction, TransactionType};
use crate::error::AppError;
use crate::store::{LedgerStore, StoreError};

use super::{CreateAccountCommand, DepositCommand, WithdrawCommand};

/// The mutation core of the ledger.
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    channel: Arc<dyn EventChannel>,
    withdrawal_limit: Decimal,
    audit_topic: String,
}

impl LedgerService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        channel: Arc<dyn EventChannel>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            channel,
            withdrawal_limit: config.withdrawal_limit,
            audit_topic: config.audit_topic.clone(),
        }
    }

    /// Execute a deposit and return the post-mutation balance.
    pub async fn deposit(&self, command: DepositCommand) -> Result<Decimal, AppError> {
        let amount = validate_mutation(&command.account_number, &command.amount)?;

        let account = self.load_account(&command.account_number).await?;

        let mut updated = account.clone();
        updated.balance += amount.value();

        let transaction = Transaction::new(
            account.account_number.clone(),
            TransactionType::Deposit,
            amount.value(),
        );

        let committed = self
            .store
            .commit_mutation(&updated, account.version, &transaction)
            .await
            .map_err(map_store_error)?;

        self.publish_audit(TransactionType::Deposit, amount.value(), &committed.account_number)
            .await;

        Ok(committed.balance)
    }

    /// Execute a withdrawal and return the post-mutation balance.
    ///
    /// Check order is load-bearing: shape, then the configured ceiling, then
    /// the balance. Each failure carries its own message.
    pub async fn withdraw(&self, command: WithdrawCommand) -> Result<Decimal, AppError> {
        let amount = validate_mutation(&command.account_number, &command.amount)?;

        let account = self.load_account(&command.account_number).await?;

        if amount.value() > self.withdrawal_limit {
            return Err(LedgerError::WithdrawalLimitExceeded {
                limit: self.withdrawal_limit,
            }
            .into());
        }

        if amount.value() > account.balance {
            return Err(LedgerError::InsufficientBalance {
                required: amount.value(),
                available: account.balance,
            }
            .into());
        }

        let mut updated = account.clone();
        updated.balance -= amount.value();

        let transaction = Transaction::new(
            account.account_number.clone(),
            TransactionType::Withdrawal,
            amount.value(),
        );

        let committed = self
            .store
            .commit_mutation(&updated, account.version, &transaction)
            .await
            .map_err(map_store_error)?;

        self.publish_audit(
            TransactionType::Withdrawal,
            amount.value(),
            &committed.account_number,
        )
        .await;

        Ok(committed.balance)
    }

    /// Create a new account, optionally seeded from a balance text.
    ///
    /// The balance text is parsed as an integer-valued decimal; a blank or
    /// missing text means zero. Negative values pass through unchecked.
    pub async fn create_account(&self, command: CreateAccountCommand) -> Result<Account, AppError> {
        if self
            .store
            .find_account(&command.account_number)
            .await
            .map_err(map_store_error)?
            .is_some()
        {
            return Err(LedgerError::AccountAlreadyExists(command.account_number).into());
        }

        let balance = match command.initial_balance.as_deref() {
            Some(text) if !text.trim().is_empty() => text
                .parse::<i64>()
                .map(Decimal::from)
                .map_err(|_| LedgerError::InvalidRequest)?,
            _ => Decimal::ZERO,
        };

        let account = Account::new(command.account_number, command.name, balance);
        let created = self
            .store
            .insert_account(&account)
            .await
            .map_err(map_store_error)?;

        tracing::info!(
            account_number = %created.account_number,
            balance = %created.balance,
            "account created"
        );

        Ok(created)
    }

    async fn load_account(&self, account_number: &str) -> Result<Account, AppError> {
        self.store
            .find_account(account_number)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| LedgerError::AccountNotFound(account_number.to_string()).into())
    }

    /// Fire-and-forget audit publish, strictly after the store commit.
    async fn publish_audit(&self, kind: TransactionType, amount: Decimal, account_number: &str) {
        let message = codec::encode(kind, amount, account_number);
        tracing::info!(topic = %self.audit_topic, %message, "publishing audit message");

        if let Err(e) = self.channel.publish(&self.audit_topic, &message).await {
            // The mutation is already committed; the lost audit event is an
            // observability concern only.
            tracing::warn!(error = %e, topic = %self.audit_topic, "audit publish failed");
        }
    }
}

/// Shape validation shared by deposit and withdraw.
fn validate_mutation(account_number: &str, amount_text: &str) -> Result<Amount, LedgerError> {
    if account_number.trim().is_empty() {
        return Err(LedgerError::InvalidRequest);
    }
    amount_text
        .parse::<Amount>()
        .map_err(|_| LedgerError::InvalidRequest)
}

fn map_store_error(err: StoreError) -> AppError {
    match err {
        StoreError::VersionConflict {
            account_number,
            expected,
        } => LedgerError::VersionConflict {
            account_number,
            expected,
        }
        .into(),
        StoreError::DuplicateAccount(number) => LedgerError::AccountAlreadyExists(number).into(),
        StoreError::AccountNotFound(number) => LedgerError::AccountNotFound(number).into(),
        StoreError::Database(e) => AppError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::BroadcastChannel;
    use crate::store::InMemoryLedgerStore;
    use rust_decimal_macros::dec;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            database_max_connections: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            withdrawal_limit: dec!(1000),
            audit_topic: "change-log".to_string(),
            audit_consumer_group: "test-group".to_string(),
            audit_match_withdrawals: false,
        }
    }

    fn service() -> (LedgerService, Arc<InMemoryLedgerStore>) {
        let store = Arc::new(InMemoryLedgerStore::new());
        let channel = Arc::new(BroadcastChannel::new());
        let service = LedgerService::new(store.clone(), channel, &test_config());
        (service, store)
    }

    async fn seeded_service(balance: Decimal) -> (LedgerService, Arc<InMemoryLedgerStore>) {
        let (service, store) = service();
        store
            .insert_account(&Account::new(
                "123".to_string(),
                "Alice".to_string(),
                balance,
            ))
            .await
            .unwrap();
        (service, store)
    }

    #[tokio::test]
    async fn test_deposit_adds_to_balance() {
        let (service, store) = seeded_service(dec!(10)).await;

        let balance = service
            .deposit(DepositCommand::new("123".to_string(), "100.00".to_string()))
            .await
            .unwrap();

        assert_eq!(balance, dec!(110.00));
        let transactions = store.transactions();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionType::Deposit);
        assert_eq!(transactions[0].amount, dec!(100.00));
    }

    #[tokio::test]
    async fn test_deposit_blank_account_rejected() {
        let (service, store) = seeded_service(dec!(10)).await;

        let result = service
            .deposit(DepositCommand::new("   ".to_string(), "100".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Ledger(LedgerError::InvalidRequest))
        ));
        assert!(store.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_non_positive_amount_rejected() {
        let (service, store) = seeded_service(dec!(10)).await;

        for amount in ["0", "-5", "garbage"] {
            let result = service
                .deposit(DepositCommand::new("123".to_string(), amount.to_string()))
                .await;
            assert!(matches!(
                result,
                Err(AppError::Ledger(LedgerError::InvalidRequest))
            ));
        }

        assert!(store.transactions().is_empty());
        let account = store.find_account("123").await.unwrap().unwrap();
        assert_eq!(account.balance, dec!(10));
    }

    #[tokio::test]
    async fn test_deposit_unknown_account() {
        let (service, _store) = service();

        let result = service
            .deposit(DepositCommand::new("999".to_string(), "100".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Ledger(LedgerError::AccountNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_withdraw_subtracts_from_balance() {
        let (service, store) = seeded_service(dec!(100)).await;

        let balance = service
            .withdraw(WithdrawCommand::new("123".to_string(), "30".to_string()))
            .await
            .unwrap();

        assert_eq!(balance, dec!(70));
        assert_eq!(store.transactions()[0].kind, TransactionType::Withdrawal);
    }

    #[tokio::test]
    async fn test_withdraw_limit_checked_before_balance() {
        // Balance far above the limit: the limit error must win.
        let (service, store) = seeded_service(dec!(50000)).await;

        let result = service
            .withdraw(WithdrawCommand::new("123".to_string(), "2000".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Ledger(LedgerError::WithdrawalLimitExceeded { .. }))
        ));
        assert!(store.transactions().is_empty());
        let account = store.find_account("123").await.unwrap().unwrap();
        assert_eq!(account.balance, dec!(50000));
    }

    #[tokio::test]
    async fn test_withdraw_insufficient_balance_under_limit() {
        let (service, store) = seeded_service(dec!(100)).await;

        let result = service
            .withdraw(WithdrawCommand::new("123".to_string(), "500".to_string()))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Ledger(LedgerError::InsufficientBalance { .. }))
        ));
        assert!(store.transactions().is_empty());
        let account = store.find_account("123").await.unwrap().unwrap();
        assert_eq!(account.balance, dec!(100));
    }

    #[tokio::test]
    async fn test_create_account_defaults_to_zero() {
        let (service, _store) = service();

        let account = service
            .create_account(CreateAccountCommand::new(
                "456".to_string(),
                "Bob".to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(account.version, 0);
    }

    #[tokio::test]
    async fn test_create_account_parses_integer_balance() {
        let (service, _store) = service();

        let account = service
            .create_account(
                CreateAccountCommand::new("456".to_string(), "Bob".to_string())
                    .with_initial_balance("500".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(account.balance, dec!(500));
    }

    #[tokio::test]
    async fn test_create_account_keeps_negative_balance() {
        // Opening balances are pass-through; only mutations enforce the
        // non-negative invariant.
        let (service, _store) = service();

        let account = service
            .create_account(
                CreateAccountCommand::new("456".to_string(), "Bob".to_string())
                    .with_initial_balance("-500".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(account.balance, dec!(-500));
    }

    #[tokio::test]
    async fn test_create_account_rejects_fractional_balance_text() {
        let (service, _store) = service();

        let result = service
            .create_account(
                CreateAccountCommand::new("456".to_string(), "Bob".to_string())
                    .with_initial_balance("10.50".to_string()),
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::Ledger(LedgerError::InvalidRequest))
        ));
    }

    #[tokio::test]
    async fn test_create_account_duplicate_rejected() {
        let (service, store) = seeded_service(dec!(10)).await;

        let result = service
            .create_account(CreateAccountCommand::new(
                "123".to_string(),
                "Mallory".to_string(),
            ))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Ledger(LedgerError::AccountAlreadyExists(_)))
        ));
        let account = store.find_account("123").await.unwrap().unwrap();
        assert_eq!(account.name, "Alice");
        assert_eq!(account.balance, dec!(10));
    }
}
