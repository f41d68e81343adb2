//! Common test utilities
//!
//! Wires the full pipeline in memory: ledger service, stores, channel, and
//! the audit subscriber, so the suite runs without external services.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use tokio::task::JoinHandle;

use bank_ledger::audit::AuditSubscriber;
use bank_ledger::channel::BroadcastChannel;
use bank_ledger::domain::ChangeLog;
use bank_ledger::service::LedgerService;
use bank_ledger::store::{InMemoryAuditStore, InMemoryLedgerStore};
use bank_ledger::Config;

pub struct TestApp {
    pub service: Arc<LedgerService>,
    pub ledger_store: Arc<InMemoryLedgerStore>,
    pub audit_store: Arc<InMemoryAuditStore>,
    pub channel: Arc<BroadcastChannel>,
    pub audit_task: JoinHandle<()>,
}

pub fn test_config() -> Config {
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

/// Wire the default pipeline.
pub fn setup() -> TestApp {
    setup_with(test_config())
}

/// Wire the pipeline with a custom configuration. Must run inside a tokio
/// runtime: the audit subscriber is spawned immediately so it is listening
/// before the first publish.
pub fn setup_with(config: Config) -> TestApp {
    let ledger_store = Arc::new(InMemoryLedgerStore::new());
    let audit_store = Arc::new(InMemoryAuditStore::new());
    let channel = Arc::new(BroadcastChannel::new());

    let audit_task = AuditSubscriber::new(audit_store.clone(), &config).start(channel.as_ref());

    let service = Arc::new(LedgerService::new(
        ledger_store.clone(),
        channel.clone(),
        &config,
    ));

    TestApp {
        service,
        ledger_store,
        audit_store,
        channel,
        audit_task,
    }
}

/// Poll the audit store until `expected` rows landed or a short deadline
/// passes; returns whatever is there.
pub async fn wait_for_entries(store: &InMemoryAuditStore, expected: usize) -> Vec<ChangeLog> {
    for _ in 0..100 {
        let entries = store.entries();
        if entries.len() >= expected {
            return entries;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    store.entries()
}
