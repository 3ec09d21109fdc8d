//! Broker transport seam for job intake and status publishing.
//!
//! The service consumes job trigger messages from a topic-based broker and
//! publishes status updates back to it. The concrete transport lives behind
//! the [`MessageSource`] and [`MessagePublisher`] traits so the pipeline can
//! run against an in-process broker in tests and local development.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

pub type Result<T> = std::result::Result<T, BrokerError>;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Failed to publish message: {0}")]
    PublishFailed(String),

    #[error("Broker connection closed")]
    Closed,
}

/// A message received from the broker.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Source of inbound job trigger messages.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message. Returns `None` when the source is closed.
    async fn next(&mut self) -> Option<InboundMessage>;
}

/// Outbound publisher for status messages.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;

    /// Whether the publisher is currently able to deliver messages.
    async fn health(&self) -> bool {
        true
    }
}

/// In-process broker backed by tokio channels.
///
/// Inbound messages flow through an mpsc channel to a single consumer, while
/// outbound status messages fan out over a broadcast channel so multiple
/// observers can watch them.
pub struct MemoryBroker {
    inbound_tx: mpsc::Sender<InboundMessage>,
    outbound_tx: broadcast::Sender<InboundMessage>,
}

impl MemoryBroker {
    pub fn new(capacity: usize) -> (Self, MemorySource) {
        let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
        let (outbound_tx, _) = broadcast::channel(capacity);
        (
            Self {
                inbound_tx,
                outbound_tx,
            },
            MemorySource { rx: inbound_rx },
        )
    }

    /// Inject a message into the inbound stream, as if it arrived from the
    /// wire.
    pub async fn inject(&self, topic: impl Into<String>, payload: Vec<u8>) -> Result<()> {
        self.inbound_tx
            .send(InboundMessage {
                topic: topic.into(),
                payload,
            })
            .await
            .map_err(|_| BrokerError::Closed)
    }

    pub fn publisher(&self) -> MemoryPublisher {
        MemoryPublisher {
            tx: self.outbound_tx.clone(),
        }
    }

    /// Subscribe to messages published through this broker.
    pub fn subscribe(&self) -> broadcast::Receiver<InboundMessage> {
        self.outbound_tx.subscribe()
    }
}

pub struct MemorySource {
    rx: mpsc::Receiver<InboundMessage>,
}

#[async_trait]
impl MessageSource for MemorySource {
    async fn next(&mut self) -> Option<InboundMessage> {
        self.rx.recv().await
    }
}

#[derive(Clone)]
pub struct MemoryPublisher {
    tx: broadcast::Sender<InboundMessage>,
}

#[async_trait]
impl MessagePublisher for MemoryPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.tx
            .send(InboundMessage {
                topic: topic.to_string(),
                payload,
            })
            .map(|_| ())
            .map_err(|e| BrokerError::PublishFailed(e.to_string()))
    }

    async fn health(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inject_and_receive() {
        let (broker, mut source) = MemoryBroker::new(8);
        broker
            .inject("controltower/server_pm/42", b"{}".to_vec())
            .await
            .unwrap();

        let msg = source.next().await.unwrap();
        assert_eq!(msg.topic, "controltower/server_pm/42");
        assert_eq!(msg.payload, b"{}");
    }

    #[tokio::test]
    async fn test_source_closes_when_broker_dropped() {
        let (broker, mut source) = MemoryBroker::new(8);
        drop(broker);
        assert!(source.next().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_fans_out_to_subscribers() {
        let (broker, _source) = MemoryBroker::new(8);
        let mut sub = broker.subscribe();
        let publisher = broker.publisher();

        publisher
            .publish("controltower/server_pm_status/42", b"done".to_vec())
            .await
            .unwrap();

        let msg = sub.recv().await.unwrap();
        assert_eq!(msg.topic, "controltower/server_pm_status/42");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_fails() {
        let (broker, _source) = MemoryBroker::new(8);
        let publisher = broker.publisher();

        let result = publisher.publish("controltower/x_status/1", vec![]).await;
        assert!(matches!(result, Err(BrokerError::PublishFailed(_))));
        assert!(!publisher.health().await);
    }
}
