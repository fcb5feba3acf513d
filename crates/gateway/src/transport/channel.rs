//! Tokio channel-based transport for single-process mode
//!
//! Uses broadcast channels for pub/sub semantics within a single process.
//! No serialization overhead - messages are passed directly.

use crate::error::TransportError;
use crate::transport::{Publisher, Subscriber};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Channel-based publisher using broadcast
pub struct ChannelPublisher<M> {
    tx: broadcast::Sender<M>,
}

impl<M: Clone> ChannelPublisher<M> {
    /// Create a new publisher with the given broadcast sender
    pub fn new(tx: broadcast::Sender<M>) -> Self {
        Self { tx }
    }

    /// Create a publisher/subscriber pair with given capacity
    pub fn pair(capacity: usize) -> (Self, ChannelSubscriber<M>) {
        let (tx, rx) = broadcast::channel(capacity);
        (Self { tx: tx.clone() }, ChannelSubscriber { rx, _tx: tx })
    }

    /// Get another subscriber for this publisher
    pub fn subscribe(&self) -> ChannelSubscriber<M> {
        ChannelSubscriber {
            rx: self.tx.subscribe(),
            _tx: self.tx.clone(),
        }
    }

    /// Publish without awaiting (broadcast send is synchronous); errors when
    /// every subscriber is gone
    pub fn send(&self, msg: M) -> Result<(), TransportError> {
        self.tx.send(msg).map_err(|_| TransportError::ChannelClosed)?;
        Ok(())
    }
}

#[async_trait]
impl<M> Publisher<M> for ChannelPublisher<M>
where
    M: Clone + Send + Sync + 'static,
{
    async fn publish(&self, msg: &M) -> Result<(), TransportError> {
        self.send(msg.clone())
    }
}

/// Channel-based subscriber using broadcast receiver
pub struct ChannelSubscriber<M> {
    rx: broadcast::Receiver<M>,
    // Keep sender alive to prevent channel from closing
    _tx: broadcast::Sender<M>,
}

impl<M: Clone> ChannelSubscriber<M> {
    /// Create a new subscriber from a broadcast receiver
    pub fn new(rx: broadcast::Receiver<M>, tx: broadcast::Sender<M>) -> Self {
        Self { rx, _tx: tx }
    }
}

#[async_trait]
impl<M> Subscriber<M> for ChannelSubscriber<M>
where
    M: Clone + Send + 'static,
{
    async fn next(&mut self) -> Result<M, TransportError> {
        loop {
            match self.rx.recv().await {
                Ok(msg) => return Ok(msg),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Skip lagged messages and continue
                    log::warn!("[TRANSPORT] subscriber lagged, skipped {} messages", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(TransportError::ChannelClosed);
                }
            }
        }
    }

    fn try_next(&mut self) -> Result<Option<M>, TransportError> {
        match self.rx.try_recv() {
            Ok(msg) => Ok(Some(msg)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Lagged(_)) => {
                // Return None on lag, caller can retry
                Ok(None)
            }
            Err(broadcast::error::TryRecvError::Closed) => Err(TransportError::ChannelClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pubsub() {
        let (publisher, mut subscriber) = ChannelPublisher::<String>::pair(10);

        publisher.publish(&"hello".to_string()).await.unwrap();

        let msg = subscriber.next().await.unwrap();
        assert_eq!(msg, "hello");
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let (publisher, mut sub1) = ChannelPublisher::<i32>::pair(10);
        let mut sub2 = publisher.subscribe();

        publisher.publish(&42).await.unwrap();

        assert_eq!(sub1.next().await.unwrap(), 42);
        assert_eq!(sub2.next().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_try_next_empty() {
        let (_publisher, mut subscriber) = ChannelPublisher::<i32>::pair(10);
        assert!(subscriber.try_next().unwrap().is_none());
    }
}
