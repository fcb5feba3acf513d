//! Paper venue - an in-process simulated brokerage
//!
//! Implements `BrokerGateway` against in-memory state. Order acks are
//! immediate; fills, rejections and ticks are injected by the harness (or a
//! paper-trading driver) through the `push_*` methods and flow to consumers
//! over the same channels a live adapter would use. Cancellation follows the
//! live contract: `cancel_order` only enqueues the Cancelled event.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use garuda_core::InstrumentId;
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::broadcast;

use crate::broker::{BrokerGateway, BrokerPosition};
use crate::error::GatewayError;
use crate::messages::market_data::TickMessage;
use crate::messages::order::{OrderUpdateEvent, OrderVariety, PlaceOrderAck, VenueOrderRequest};
use crate::transport::channel::ChannelSubscriber;

struct PaperState {
    next_order_id: u64,
    /// Orders the venue has accepted, by broker order id
    orders: HashMap<String, VenueOrderRequest>,
    /// Requests in arrival order, for assertions
    requests: Vec<VenueOrderRequest>,
    cash: Decimal,
    positions: Vec<BrokerPosition>,
    /// When set, the next place_order fails with this transport error
    fail_next_place: Option<String>,
    /// When set, the next place_order is refused by the venue
    reject_next_place: Option<String>,
}

/// In-process simulated venue
pub struct PaperGateway {
    state: Mutex<PaperState>,
    order_events: broadcast::Sender<OrderUpdateEvent>,
    ticks: broadcast::Sender<TickMessage>,
}

impl PaperGateway {
    pub fn new(starting_cash: Decimal) -> Self {
        let (order_events, _) = broadcast::channel(1024);
        let (ticks, _) = broadcast::channel(4096);
        Self {
            state: Mutex::new(PaperState {
                next_order_id: 0,
                orders: HashMap::new(),
                requests: Vec::new(),
                cash: starting_cash,
                positions: Vec::new(),
                fail_next_place: None,
                reject_next_place: None,
            }),
            order_events,
            ticks,
        }
    }

    /// Broker order id of the most recently placed order
    pub fn last_order_id(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        if state.next_order_id == 0 {
            None
        } else {
            Some(format!("P-{}", state.next_order_id))
        }
    }

    /// Most recently received request payload
    pub fn last_request(&self) -> Option<VenueOrderRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }

    /// All request payloads received so far
    pub fn requests(&self) -> Vec<VenueOrderRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Make the next place_order fail at the transport layer
    pub fn fail_next_place(&self, message: impl Into<String>) {
        self.state.lock().unwrap().fail_next_place = Some(message.into());
    }

    /// Make the venue refuse the next place_order
    pub fn reject_next_place(&self, message: impl Into<String>) {
        self.state.lock().unwrap().reject_next_place = Some(message.into());
    }

    /// Replace the broker-side cash figure
    pub fn set_cash(&self, cash: Decimal) {
        self.state.lock().unwrap().cash = cash;
    }

    /// Replace the broker-side position snapshot
    pub fn set_positions(&self, positions: Vec<BrokerPosition>) {
        self.state.lock().unwrap().positions = positions;
    }

    /// Push an Open (accepted) event for an order
    pub fn push_open(&self, order_id: &str) {
        let _ = self.order_events.send(OrderUpdateEvent::open(order_id));
    }

    /// Push a fill event; `complete` marks the final fill
    pub fn push_fill(&self, order_id: &str, quantity: Decimal, price: Decimal, complete: bool) {
        let _ = self
            .order_events
            .send(OrderUpdateEvent::fill(order_id, quantity, price, complete));
    }

    /// Push a rejection event
    pub fn push_reject(&self, order_id: &str, reason: &str) {
        let _ = self
            .order_events
            .send(OrderUpdateEvent::rejected(order_id, reason));
    }

    /// Push a cancellation event
    pub fn push_cancelled(&self, order_id: &str) {
        let _ = self.order_events.send(OrderUpdateEvent::cancelled(order_id));
    }

    /// Push a raw order-update event
    pub fn push_event(&self, event: OrderUpdateEvent) {
        let _ = self.order_events.send(event);
    }

    /// Push a market tick
    pub fn push_tick(
        &self,
        instrument_id: impl Into<InstrumentId>,
        price: Decimal,
        quantity: Decimal,
        timestamp: DateTime<Utc>,
    ) {
        let _ = self
            .ticks
            .send(TickMessage::new(instrument_id, price, quantity, timestamp));
    }
}

impl Default for PaperGateway {
    fn default() -> Self {
        Self::new(dec!(1_000_000))
    }
}

#[async_trait]
impl BrokerGateway for PaperGateway {
    async fn place_order(
        &self,
        request: &VenueOrderRequest,
    ) -> Result<PlaceOrderAck, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if let Some(message) = state.fail_next_place.take() {
            return Err(GatewayError::Connection(message));
        }
        if let Some(message) = state.reject_next_place.take() {
            return Err(GatewayError::Venue(message));
        }

        state.next_order_id += 1;
        let order_id = format!("P-{}", state.next_order_id);
        state.orders.insert(order_id.clone(), request.clone());

        info!(
            "[PAPER] accepted {} {} {} x {} as {}",
            request.transaction_type.as_str(),
            request.order_type.as_str(),
            request.trading_symbol,
            request.quantity,
            order_id
        );
        Ok(PlaceOrderAck { order_id })
    }

    async fn cancel_order(
        &self,
        order_id: &str,
        variety: OrderVariety,
    ) -> Result<(), GatewayError> {
        let known = self.state.lock().unwrap().orders.contains_key(order_id);
        if !known {
            return Err(GatewayError::UnknownOrder(order_id.to_string()));
        }

        debug!("[PAPER] cancel {} ({})", order_id, variety.as_str());
        // The venue confirms asynchronously through the order feed
        let _ = self.order_events.send(OrderUpdateEvent::cancelled(order_id));
        Ok(())
    }

    async fn positions(&self) -> Result<Vec<BrokerPosition>, GatewayError> {
        Ok(self.state.lock().unwrap().positions.clone())
    }

    async fn cash(&self) -> Result<Decimal, GatewayError> {
        Ok(self.state.lock().unwrap().cash)
    }

    fn subscribe_order_updates(&self) -> ChannelSubscriber<OrderUpdateEvent> {
        ChannelSubscriber::new(self.order_events.subscribe(), self.order_events.clone())
    }

    fn subscribe_ticks(&self) -> ChannelSubscriber<TickMessage> {
        ChannelSubscriber::new(self.ticks.subscribe(), self.ticks.clone())
    }
}
