//! Order Router
//!
//! Turns accepted intents into the venue's wire payload and owns the
//! submission path: risk gate, order bookkeeping, the single outbound
//! place_order call, and the local acknowledgment. Transport failures mark
//! the order Rejected locally and are never retried - retrying a possibly
//! accepted order risks duplicate execution.

use std::sync::Arc;

use garuda_core::{
    ExchangeSegment, InstrumentMeta, Order, OrderIntent, OrderKind, OrderRef, OrderStatus, Side,
};
use garuda_gateway::{
    BrokerGateway, OrderVariety, ProductType, TransactionType, Validity, VenueOrderRequest,
    VenueOrderType,
};
use garuda_ports::{CancelError, InstrumentLookup, SubmitError};
use log::{info, warn};

use crate::ledger::PositionLedger;
use crate::market::LastPriceCache;
use crate::orders::OrderStore;
use crate::risk::{RiskDecision, RiskGate};

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Margining treatment stamped on every order
    pub product_type: ProductType,
    /// Validity stamped on every order
    pub validity: Validity,
    /// Exchange segment used for instrument lookup and as payload fallback
    pub exchange: ExchangeSegment,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            product_type: ProductType::Intraday,
            validity: Validity::Day,
            exchange: ExchangeSegment::Nse,
        }
    }
}

/// Maps intents to venue requests and submits them through the gateway
pub struct OrderRouter {
    gateway: Arc<dyn BrokerGateway>,
    store: Arc<OrderStore>,
    ledger: Arc<PositionLedger>,
    risk: Arc<RiskGate>,
    instruments: Arc<dyn InstrumentLookup>,
    last_prices: Arc<LastPriceCache>,
    config: RouterConfig,
}

impl OrderRouter {
    pub fn new(
        gateway: Arc<dyn BrokerGateway>,
        store: Arc<OrderStore>,
        ledger: Arc<PositionLedger>,
        risk: Arc<RiskGate>,
        instruments: Arc<dyn InstrumentLookup>,
        last_prices: Arc<LastPriceCache>,
        config: RouterConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            ledger,
            risk,
            instruments,
            last_prices,
            config,
        }
    }

    /// Validate, risk-check and submit an intent.
    ///
    /// Blocks on the outbound venue call; no lock is held across it.
    pub async fn submit(&self, intent: OrderIntent) -> Result<OrderRef, SubmitError> {
        intent.validate()?;

        let meta = self
            .instruments
            .lookup(intent.instrument_id.as_str(), self.config.exchange);
        let position = self.ledger.position(&intent.instrument_id);
        let cash = self.ledger.cash();
        let last_price = self.last_prices.get(&intent.instrument_id);

        let intent = match self
            .risk
            .evaluate(&intent, &position, cash, meta.as_ref(), last_price)
        {
            RiskDecision::Reject(reason) => {
                // The order exists, in Rejected, so the decision is auditable
                let mut order = Order::from_intent(&intent);
                order.status = OrderStatus::Rejected;
                let order_ref = order.local_ref;
                self.store.insert(order);
                return Err(SubmitError::Rejected { order_ref, reason });
            }
            RiskDecision::Accept { intent, .. } => intent,
        };

        let order = Order::from_intent(&intent);
        let order_ref = order.local_ref;
        let request = self.build_request(&order, meta.as_ref());
        self.store.insert(order);

        // Single outbound call to the venue, never retried
        match self.gateway.place_order(&request).await {
            Ok(ack) => {
                self.store.acknowledge(&order_ref, &ack.order_id);
                info!(
                    "[ROUTER] {} {} {} x {} submitted as {}",
                    request.transaction_type.as_str(),
                    request.order_type.as_str(),
                    request.trading_symbol,
                    request.quantity,
                    ack.order_id
                );
                Ok(order_ref)
            }
            Err(e) => {
                // The venue is assumed not to have accepted it
                self.store.update(&order_ref, |order| {
                    order.status = OrderStatus::Rejected;
                    order.updated_at = chrono::Utc::now();
                });
                warn!("[ROUTER] submission of {} failed: {}", order_ref, e);
                Err(SubmitError::Transport {
                    order_ref,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Fire-and-forget cancellation; local state changes only when the
    /// Cancelled event arrives through reconciliation.
    pub async fn cancel(&self, order_ref: OrderRef) -> Result<(), CancelError> {
        let order = self
            .store
            .get(&order_ref)
            .ok_or(CancelError::UnknownOrder(order_ref))?;
        if order.status.is_terminal() {
            return Err(CancelError::AlreadyTerminal {
                order_ref,
                status: order.status,
            });
        }
        let broker_id = order
            .broker_order_id
            .ok_or(CancelError::NotAcknowledged(order_ref))?;

        self.gateway
            .cancel_order(&broker_id, variety_for(order.kind))
            .await
            .map_err(|e| CancelError::Transport(e.to_string()))?;

        info!("[ROUTER] cancel requested for {} ({})", order_ref, broker_id);
        Ok(())
    }

    /// Map an order onto the venue's field layout.
    ///
    /// Every kind maps exhaustively; missing metadata falls back to the
    /// instrument id as symbol/token with a warning, leaving the venue to
    /// refuse what it does not recognize.
    fn build_request(&self, order: &Order, meta: Option<&InstrumentMeta>) -> VenueOrderRequest {
        let (variety, order_type) = match order.kind {
            OrderKind::Market => (OrderVariety::Normal, VenueOrderType::Market),
            OrderKind::Limit => (OrderVariety::Normal, VenueOrderType::Limit),
            OrderKind::StopMarket => (OrderVariety::Normal, VenueOrderType::StopLossMarket),
            OrderKind::StopLimit => (OrderVariety::Normal, VenueOrderType::StopLossLimit),
            OrderKind::Bracket => (OrderVariety::Bracket, VenueOrderType::Limit),
            OrderKind::Cover => (OrderVariety::Cover, VenueOrderType::Limit),
        };

        let (trading_symbol, symbol_token, exchange) = match meta {
            Some(meta) => (meta.symbol.clone(), meta.token.clone(), meta.exchange),
            None => {
                warn!(
                    "[ROUTER] no metadata for {}, submitting with raw symbol",
                    order.instrument_id
                );
                (
                    order.instrument_id.as_str().to_string(),
                    order.instrument_id.as_str().to_string(),
                    self.config.exchange,
                )
            }
        };

        VenueOrderRequest {
            client_order_id: order.local_ref.to_string(),
            variety,
            trading_symbol,
            symbol_token,
            transaction_type: match order.side {
                Side::Buy => TransactionType::Buy,
                Side::Sell => TransactionType::Sell,
            },
            exchange,
            order_type,
            product_type: self.config.product_type,
            duration: self.config.validity,
            quantity: order.quantity,
            price: order.limit_price,
            trigger_price: order.trigger_price,
            squareoff: order.bracket.map(|b| b.squareoff),
            stoploss: order.bracket.map(|b| b.stoploss),
            trailing_stoploss: order.bracket.and_then(|b| b.trailing_stoploss),
        }
    }
}

/// Variety used when cancelling an order of the given kind
fn variety_for(kind: OrderKind) -> OrderVariety {
    match kind {
        OrderKind::Bracket => OrderVariety::Bracket,
        OrderKind::Cover => OrderVariety::Cover,
        _ => OrderVariety::Normal,
    }
}
