//! Event Channel
//!
//! Asynchronous pub/sub bus carrying free-text audit messages. The channel
//! offers no delivery guarantee beyond best effort: a publish with no live
//! subscriber drops the message, and a lagging subscriber loses the oldest
//! buffered messages.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

/// Subscription handle for one topic.
pub type Subscription = broadcast::Receiver<String>;

/// Buffered messages per topic before laggards start losing them.
const TOPIC_CAPACITY: usize = 256;

/// Errors surfaced by channel adapters
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel publish failed: {0}")]
    Publish(String),
}

/// Publish/subscribe interface over the audit message bus.
///
/// `publish` is fire-and-forget: the ledger never consumes a delivery
/// acknowledgment. Subscribers run on their own execution context.
#[async_trait]
pub trait EventChannel: Send + Sync {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), ChannelError>;

    fn subscribe(&self, topic: &str) -> Subscription;
}

/// In-process channel over per-topic `tokio::sync::broadcast` streams.
#[derive(Debug, Default)]
pub struct BroadcastChannel {
    topics: Mutex<HashMap<String, broadcast::Sender<String>>>,
}

impl BroadcastChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<String> {
        let mut topics = self.topics.lock().unwrap();
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl EventChannel for BroadcastChannel {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), ChannelError> {
        // send() only errors when nobody is subscribed; for a best-effort
        // bus that is a successful publish of a message nobody wanted.
        let receivers = self.sender(topic).send(message.to_string()).unwrap_or(0);
        tracing::debug!(topic, receivers, "published audit message");
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Subscription {
        self.sender(topic).subscribe()
    }
}
