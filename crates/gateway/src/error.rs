//! Error types for the gateway crate

use thiserror::Error;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Subscription failed: {0}")]
    Subscribe(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Timeout waiting for response")]
    Timeout,
}

/// Gateway-level errors (venue operations)
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Connection error: {0}")]
    Connection(String),

    /// The venue answered but refused the request
    #[error("Venue error: {0}")]
    Venue(String),

    #[error("Unknown order id: {0}")]
    UnknownOrder(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Serialization(e.to_string())
    }
}
