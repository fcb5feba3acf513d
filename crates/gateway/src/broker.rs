//! The venue boundary trait
//!
//! Everything the bridge needs from a brokerage venue: one synchronous
//! request path (place/cancel/positions/cash) and two push streams (order
//! updates, ticks). Implementations must not buffer acks - `place_order`
//! returning is the only signal that the venue has the order.

use async_trait::async_trait;
use garuda_core::InstrumentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::messages::market_data::TickMessage;
use crate::messages::order::{OrderUpdateEvent, OrderVariety, PlaceOrderAck, VenueOrderRequest};
use crate::transport::channel::ChannelSubscriber;

/// Broker-side position snapshot, as reported by the venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerPosition {
    pub instrument_id: InstrumentId,
    /// Net quantity (positive = long, negative = short)
    pub quantity: Decimal,
    /// Net average entry price
    pub avg_price: Decimal,
}

/// Abstract brokerage venue
///
/// The calls block until the venue answers; no implicit timeout is applied.
/// Cancellation is fire-and-forget: a successful `cancel_order` only means
/// the venue took the request, the Cancelled event arrives on the order
/// update stream.
#[async_trait]
pub trait BrokerGateway: Send + Sync {
    /// Submit an order; the ack carries the broker-assigned order id
    async fn place_order(&self, request: &VenueOrderRequest)
    -> Result<PlaceOrderAck, GatewayError>;

    /// Request cancellation of a live order
    async fn cancel_order(&self, order_id: &str, variety: OrderVariety)
    -> Result<(), GatewayError>;

    /// Current broker-side positions (used at start-up and for gap recovery)
    async fn positions(&self) -> Result<Vec<BrokerPosition>, GatewayError>;

    /// Cash available at the broker
    async fn cash(&self) -> Result<Decimal, GatewayError>;

    /// Subscribe to the order-update push stream
    fn subscribe_order_updates(&self) -> ChannelSubscriber<OrderUpdateEvent>;

    /// Subscribe to the tick push stream
    fn subscribe_ticks(&self) -> ChannelSubscriber<TickMessage>;
}
