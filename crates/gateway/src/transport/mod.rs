//! Transport abstraction for the venue's push streams
//!
//! Currently uses tokio broadcast channels for single-process operation.
//! The `Publisher`/`Subscriber` traits allow plugging in other transports
//! (a real websocket feed, NATS, etc.) without touching the consumers.

pub mod channel;

use crate::error::TransportError;
use async_trait::async_trait;

/// Publishes messages to all current subscribers
#[async_trait]
pub trait Publisher<M>: Send + Sync {
    async fn publish(&self, msg: &M) -> Result<(), TransportError>;
}

/// Receives messages from a push stream
#[async_trait]
pub trait Subscriber<M>: Send {
    /// Wait for the next message
    async fn next(&mut self) -> Result<M, TransportError>;

    /// Non-blocking poll; `Ok(None)` when no message is ready
    fn try_next(&mut self) -> Result<Option<M>, TransportError>;
}
