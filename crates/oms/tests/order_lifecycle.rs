//! OMS integration test
//!
//! Exercises the full order pipeline without the runner's background tasks,
//! applying venue events to the reconciler directly:
//! 1. Risk gate evaluates the intent
//! 2. Router maps and submits it to the paper venue
//! 3. Reconciler applies the pushed events
//! 4. Ledger reflects fills; terminal states absorb everything after

use std::collections::HashMap;
use std::sync::Arc;

use garuda_core::{
    ExchangeSegment, InstrumentId, InstrumentMeta, OrderIntent, OrderStatus, Side,
};
use garuda_gateway::{OrderUpdateEvent, PaperGateway};
use garuda_oms::{
    LastPriceCache, OrderReconciler, OrderRouter, OrderStore, PositionLedger, RejectReason,
    RiskConfig, RiskGate, RouterConfig, SubmitError,
};
use garuda_ports::InstrumentLookup;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct FixedInstruments(HashMap<String, InstrumentMeta>);

impl InstrumentLookup for FixedInstruments {
    fn lookup(&self, symbol: &str, _segment: ExchangeSegment) -> Option<InstrumentMeta> {
        self.0.get(symbol).cloned()
    }
}

struct Pipeline {
    venue: Arc<PaperGateway>,
    store: Arc<OrderStore>,
    ledger: Arc<PositionLedger>,
    last_prices: Arc<LastPriceCache>,
    router: OrderRouter,
    reconciler: OrderReconciler,
}

fn pipeline(cash: Decimal) -> Pipeline {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut instruments = HashMap::new();
    instruments.insert(
        "SBIN-EQ".to_string(),
        InstrumentMeta::new("SBIN-EQ", "3045", ExchangeSegment::Nse, dec!(1000), dec!(0.05)),
    );

    let venue = Arc::new(PaperGateway::new(cash));
    let store = Arc::new(OrderStore::new());
    let ledger = Arc::new(PositionLedger::new(cash));
    let risk = Arc::new(RiskGate::new(RiskConfig::default()));
    let guard = risk.guard();
    let last_prices = Arc::new(LastPriceCache::new());

    let router = OrderRouter::new(
        venue.clone(),
        store.clone(),
        ledger.clone(),
        risk,
        Arc::new(FixedInstruments(instruments)),
        last_prices.clone(),
        RouterConfig::default(),
    );
    let reconciler = OrderReconciler::new(store.clone(), ledger.clone(), guard);

    Pipeline {
        venue,
        store,
        ledger,
        last_prices,
        router,
        reconciler,
    }
}

#[tokio::test]
async fn test_full_pipeline() {
    let p = pipeline(dec!(1_000_000));
    let sbin = InstrumentId::new("SBIN-EQ");

    // === Step 1: market intent, rewritten by slippage control ===
    p.last_prices.update(&sbin, dec!(100.02));
    let order_ref = p
        .router
        .submit(OrderIntent::market("SBIN-EQ", Side::Buy, dec!(100)))
        .await
        .unwrap();

    let request = p.venue.last_request().unwrap();
    assert_eq!(request.price, Some(dec!(100.25)));
    println!("submitted as {:?} @ {:?}", request.order_type, request.price);

    // === Step 2: venue accepts and fills in two parts ===
    let broker_id = p.store.get(&order_ref).unwrap().broker_order_id.unwrap();
    p.reconciler.apply(&OrderUpdateEvent::open(&broker_id));
    p.reconciler
        .apply(&OrderUpdateEvent::fill(&broker_id, dec!(40), dec!(100.25), false));
    p.reconciler
        .apply(&OrderUpdateEvent::fill(&broker_id, dec!(60), dec!(100.20), true));

    let order = p.store.get(&order_ref).unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.filled_quantity, dec!(100));
    // (40*100.25 + 60*100.20) / 100 = 100.22
    assert_eq!(order.avg_fill_price, Some(dec!(100.22)));

    // === Step 3: ledger reflects the fills ===
    let position = p.ledger.position(&sbin);
    assert_eq!(position.quantity(), dec!(100));
    assert_eq!(position.average_price(), Some(dec!(100.22)));
    assert_eq!(p.ledger.cash(), dec!(1_000_000) - dec!(10_022));
    println!(
        "position {} @ {:?}, cash {}",
        position.quantity(),
        position.average_price(),
        p.ledger.cash()
    );

    // === Step 4: the completed signal is suppressed ===
    let err = p
        .router
        .submit(OrderIntent::market("SBIN-EQ", Side::Buy, dec!(100)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Rejected {
            reason: RejectReason::DuplicateSignal { .. },
            ..
        }
    ));

    // === Step 5: an opposite-side fill releases it ===
    let sell_ref = p
        .router
        .submit(OrderIntent::limit("SBIN-EQ", Side::Sell, dec!(100), dec!(101)))
        .await
        .unwrap();
    let sell_broker_id = p.store.get(&sell_ref).unwrap().broker_order_id.unwrap();
    p.reconciler
        .apply(&OrderUpdateEvent::fill(&sell_broker_id, dec!(100), dec!(101), true));

    assert!(p.ledger.position(&sbin).is_flat());
    assert_eq!(p.ledger.cash(), dec!(1_000_000) - dec!(10_022) + dec!(10_100));

    let buy_again = p
        .router
        .submit(OrderIntent::limit("SBIN-EQ", Side::Buy, dec!(10), dec!(100)))
        .await;
    assert!(buy_again.is_ok());

    assert_eq!(p.reconciler.anomaly_count(), 0);
    println!("pipeline roundtrip complete");
}

#[tokio::test]
async fn test_fills_never_exceed_requested() {
    let p = pipeline(dec!(1_000_000));

    let order_ref = p
        .router
        .submit(OrderIntent::limit("SBIN-EQ", Side::Buy, dec!(10), dec!(100)))
        .await
        .unwrap();
    let broker_id = p.store.get(&order_ref).unwrap().broker_order_id.unwrap();

    // The venue claims 12 filled on a 10-lot order
    p.reconciler
        .apply(&OrderUpdateEvent::fill(&broker_id, dec!(12), dec!(100), true));

    let order = p.store.get(&order_ref).unwrap();
    assert_eq!(order.filled_quantity, dec!(10));
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(p.reconciler.anomaly_count(), 1);

    // The excess never reached the ledger
    assert_eq!(p.ledger.position(&InstrumentId::new("SBIN-EQ")).quantity(), dec!(10));
}

#[tokio::test]
async fn test_terminal_orders_are_immutable() {
    let p = pipeline(dec!(1_000_000));

    let order_ref = p
        .router
        .submit(OrderIntent::limit("SBIN-EQ", Side::Buy, dec!(10), dec!(100)))
        .await
        .unwrap();
    let broker_id = p.store.get(&order_ref).unwrap().broker_order_id.unwrap();

    p.reconciler
        .apply(&OrderUpdateEvent::fill(&broker_id, dec!(4), dec!(100), false));
    p.reconciler.apply(&OrderUpdateEvent::cancelled(&broker_id));

    let cancelled = p.store.get(&order_ref).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.filled_quantity, dec!(4));

    // Partial fills stand; later events change nothing
    p.reconciler
        .apply(&OrderUpdateEvent::fill(&broker_id, dec!(6), dec!(100), true));
    let after = p.store.get(&order_ref).unwrap();
    assert_eq!(after.status, OrderStatus::Cancelled);
    assert_eq!(after.filled_quantity, dec!(4));
    assert_eq!(p.ledger.position(&InstrumentId::new("SBIN-EQ")).quantity(), dec!(4));
}

#[tokio::test]
async fn test_short_position_flip() {
    let p = pipeline(dec!(1_000_000));
    let sbin = InstrumentId::new("SBIN-EQ");

    // Sell 30 with only a long 10: position flips short 20 at the fill price
    let buy_ref = p
        .router
        .submit(OrderIntent::limit("SBIN-EQ", Side::Buy, dec!(10), dec!(100)))
        .await
        .unwrap();
    let buy_id = p.store.get(&buy_ref).unwrap().broker_order_id.unwrap();
    p.reconciler
        .apply(&OrderUpdateEvent::fill(&buy_id, dec!(10), dec!(100), true));

    let sell_ref = p
        .router
        .submit(OrderIntent::limit("SBIN-EQ", Side::Sell, dec!(30), dec!(98)))
        .await
        .unwrap();
    let sell_id = p.store.get(&sell_ref).unwrap().broker_order_id.unwrap();
    p.reconciler
        .apply(&OrderUpdateEvent::fill(&sell_id, dec!(30), dec!(98), true));

    let position = p.ledger.position(&sbin);
    assert_eq!(position.quantity(), dec!(-20));
    assert_eq!(position.average_price(), Some(dec!(98)));
}
