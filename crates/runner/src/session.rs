//! Trading session
//!
//! The explicitly constructed session object owned by the composition root.
//! It seeds the position ledger from broker-side cash and positions, spawns
//! the two stream pumps, and exposes the `Broker` capability set plus bar
//! subscription to strategies. There is no process-wide state: every session
//! owns its tables and workers, and dropping it stops them.

use std::sync::Arc;

use async_trait::async_trait;
use garuda_bars::Bar;
use garuda_core::{InstrumentId, Order, OrderIntent, OrderRef, Position};
use garuda_gateway::{BrokerGateway, GatewayError};
use garuda_oms::{
    CancelError, LastPriceCache, OrderReconciler, OrderRouter, OrderStore, PositionLedger,
    RiskGate, SubmitError,
};
use garuda_ports::{Broker, InstrumentLookup};
use log::info;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::streams;

/// A live bridge between one strategy engine and one brokerage venue
pub struct TradingSession {
    gateway: Arc<dyn BrokerGateway>,
    store: Arc<OrderStore>,
    ledger: Arc<PositionLedger>,
    router: OrderRouter,
    reconciler: Arc<OrderReconciler>,
    last_prices: Arc<LastPriceCache>,
    bars_tx: broadcast::Sender<Bar>,
    workers: Vec<JoinHandle<()>>,
}

impl TradingSession {
    /// Build a session against a venue: seed cash/positions from the broker,
    /// wire the OMS, and start the stream pumps.
    pub async fn connect(
        config: SessionConfig,
        gateway: Arc<dyn BrokerGateway>,
        instruments: Arc<dyn InstrumentLookup>,
    ) -> Result<Self, GatewayError> {
        let cash = gateway.cash().await?;
        let broker_positions = gateway.positions().await?;

        let ledger = Arc::new(PositionLedger::new(cash));
        ledger.resync(cash, &broker_positions);

        let store = Arc::new(OrderStore::new());
        let risk = Arc::new(RiskGate::new(config.risk.clone()));
        let guard = risk.guard();
        let last_prices = Arc::new(LastPriceCache::new());

        let router = OrderRouter::new(
            gateway.clone(),
            store.clone(),
            ledger.clone(),
            risk,
            instruments,
            last_prices.clone(),
            config.router.clone(),
        );
        let reconciler = Arc::new(OrderReconciler::new(
            store.clone(),
            ledger.clone(),
            guard,
        ));

        let (bars_tx, _) = broadcast::channel(config.bar_channel_capacity);

        let workers = vec![
            tokio::spawn(streams::run_order_pump(
                gateway.subscribe_order_updates(),
                reconciler.clone(),
            )),
            tokio::spawn(streams::run_tick_pump(
                gateway.subscribe_ticks(),
                last_prices.clone(),
                config.bar_interval,
                bars_tx.clone(),
            )),
        ];

        info!(
            "[SESSION] connected: cash={}, {} broker positions",
            cash,
            broker_positions.len()
        );

        Ok(Self {
            gateway,
            store,
            ledger,
            router,
            reconciler,
            last_prices,
            bars_tx,
            workers,
        })
    }

    /// Subscribe to completed bars from the tick aggregators
    pub fn subscribe_bars(&self) -> broadcast::Receiver<Bar> {
        self.bars_tx.subscribe()
    }

    /// Copy of an order's current state
    pub fn order(&self, order_ref: &OrderRef) -> Option<Order> {
        self.store.get(order_ref)
    }

    /// Latest known traded price for an instrument
    pub fn last_price(&self, instrument_id: &InstrumentId) -> Option<Decimal> {
        self.last_prices.get(instrument_id)
    }

    /// Reconciliation consistency faults seen so far
    pub fn anomaly_count(&self) -> u64 {
        self.reconciler.anomaly_count()
    }

    /// Cash plus positions marked at the last traded price (entry price when
    /// no tick has been seen yet)
    pub fn portfolio_value(&self) -> Decimal {
        let mut value = self.ledger.cash();
        for (instrument_id, position) in self.ledger.positions() {
            let mark = self
                .last_prices
                .get(&instrument_id)
                .or(position.average_price())
                .unwrap_or(Decimal::ZERO);
            value += position.quantity() * mark;
        }
        value
    }

    /// Re-query broker-side cash, positions and open-order state after a
    /// push-stream reconnect.
    ///
    /// In-memory order state is never reset; missed terminal events are
    /// replayed idempotently by the venue and absorbed by the reconciler,
    /// while cash/position discrepancies are adopted with a logged warning.
    pub async fn resync(&self) -> Result<(), GatewayError> {
        let cash = self.gateway.cash().await?;
        let broker_positions = self.gateway.positions().await?;
        self.ledger.resync(cash, &broker_positions);
        Ok(())
    }

    /// Stop the stream pumps. Called automatically on drop.
    pub fn shutdown(&mut self) {
        for worker in self.workers.drain(..) {
            worker.abort();
        }
    }
}

impl Drop for TradingSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait]
impl Broker for TradingSession {
    async fn submit(&self, intent: OrderIntent) -> Result<OrderRef, SubmitError> {
        self.router.submit(intent).await
    }

    async fn cancel(&self, order_ref: OrderRef) -> Result<(), CancelError> {
        self.router.cancel(order_ref).await
    }

    fn position_of(&self, instrument_id: &InstrumentId) -> Position {
        self.ledger.position(instrument_id)
    }

    fn cash_available(&self) -> Decimal {
        self.ledger.cash()
    }
}
