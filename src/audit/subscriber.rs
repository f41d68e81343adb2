//! Audit Subscriber
//!
//! Consumption loop on its own tokio task: receive a message, decode it,
//! persist a ChangeLog row. Decoupled in time and failure domain from the
//! ledger; nothing here ever reaches a mutation caller.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::audit::codec;
use crate::channel::{EventChannel, Subscription};
use crate::config::Config;
use crate::domain::ChangeLog;
use crate::store::AuditStore;

/// Subscriber that mirrors decoded audit messages into the audit store.
pub struct AuditSubscriber {
    store: Arc<dyn AuditStore>,
    topic: String,
    consumer_group: String,
    match_withdrawals: bool,
}

impl AuditSubscriber {
    pub fn new(store: Arc<dyn AuditStore>, config: &Config) -> Self {
        Self {
            store,
            topic: config.audit_topic.clone(),
            consumer_group: config.audit_consumer_group.clone(),
            match_withdrawals: config.audit_match_withdrawals,
        }
    }

    /// Subscribe to the configured topic and start the consumption loop in
    /// the background. Returns a handle that can be used to abort it.
    pub fn start(self, channel: &dyn EventChannel) -> JoinHandle<()> {
        let rx = channel.subscribe(&self.topic);
        tokio::spawn(async move {
            self.run(rx).await;
        })
    }

    async fn run(self, mut rx: Subscription) {
        tracing::info!(
            topic = %self.topic,
            consumer_group = %self.consumer_group,
            "audit subscriber started"
        );

        loop {
            match rx.recv().await {
                Ok(message) => self.handle_message(&message).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        skipped,
                        consumer_group = %self.consumer_group,
                        "audit subscriber lagged, messages lost"
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }

        tracing::info!(topic = %self.topic, "audit subscriber stopped");
    }

    async fn handle_message(&self, message: &str) {
        tracing::info!(message, "received audit message");

        let Some(fact) = codec::decode_with(message, self.match_withdrawals) else {
            tracing::debug!(message, "audit message did not match, discarding");
            return;
        };

        let entry = ChangeLog::new(fact.account_number, fact.kind, fact.amount);
        if let Err(e) = self.store.insert_change_log(&entry).await {
            // Observability only: the audit trail is best-effort and the
            // producer has long since moved on.
            tracing::error!(error = %e, account_number = %entry.account_number, "failed to persist change log entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::BroadcastChannel;
    use crate::store::InMemoryAuditStore;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn test_config(match_withdrawals: bool) -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            database_max_connections: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            withdrawal_limit: dec!(10000),
            audit_topic: "change-log".to_string(),
            audit_consumer_group: "test-group".to_string(),
            audit_match_withdrawals: match_withdrawals,
        }
    }

    async fn wait_for_entries(store: &InMemoryAuditStore, expected: usize) -> Vec<ChangeLog> {
        for _ in 0..50 {
            let entries = store.entries();
            if entries.len() >= expected {
                return entries;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        store.entries()
    }

    #[tokio::test]
    async fn test_matching_message_becomes_change_log_row() {
        let store = Arc::new(InMemoryAuditStore::new());
        let channel = BroadcastChannel::new();
        let _task = AuditSubscriber::new(store.clone(), &test_config(false)).start(&channel);

        channel
            .publish("change-log", "Deposit: 100.00 to account: 123")
            .await
            .unwrap();

        let entries = wait_for_entries(&store, 1).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].account_number, "123");
        assert_eq!(entries[0].transaction_type, "Deposit");
        assert_eq!(entries[0].amount, dec!(100.00));
    }

    #[tokio::test]
    async fn test_non_matching_message_is_discarded() {
        let store = Arc::new(InMemoryAuditStore::new());
        let channel = BroadcastChannel::new();
        let _task = AuditSubscriber::new(store.clone(), &test_config(false)).start(&channel);

        channel
            .publish("change-log", "Withdraw: 50.00 from account: 123")
            .await
            .unwrap();
        channel
            .publish("change-log", "Deposit: 1 to account: 7")
            .await
            .unwrap();

        // The second message landing proves the first was consumed and dropped.
        let entries = wait_for_entries(&store, 1).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].account_number, "7");
    }

    #[tokio::test]
    async fn test_withdrawal_flag_persists_withdrawals() {
        let store = Arc::new(InMemoryAuditStore::new());
        let channel = BroadcastChannel::new();
        let _task = AuditSubscriber::new(store.clone(), &test_config(true)).start(&channel);

        channel
            .publish("change-log", "Withdraw: 50.00 from account: 123")
            .await
            .unwrap();

        let entries = wait_for_entries(&store, 1).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].transaction_type, "Withdraw");
    }
}
