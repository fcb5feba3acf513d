//! Order Reconciler
//!
//! The event-driven state machine that applies the venue's pushed order
//! updates to local order and position state:
//!
//! ```text
//! Created → Submitted → Accepted → {PartiallyFilled ⇄} → Completed
//!              │            │              │
//!              └────────────┴──────────────┴──► Rejected | Cancelled
//! ```
//!
//! Terminal states are absorbing. `apply` never fails: anomalous events
//! (unknown ids, overfills, updates to terminal orders) are logged, counted
//! and dropped so the event-consuming worker keeps processing. The transport
//! preserves per-order ordering; nothing here assumes ordering across
//! different orders.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use garuda_core::{InstrumentId, OrderStatus, Side};
use garuda_gateway::{OrderUpdateEvent, VenueOrderStatus};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;

use crate::ledger::PositionLedger;
use crate::orders::OrderStore;
use crate::risk::DuplicateGuard;

/// What the state-machine step decided, computed under the order-table lock
/// and acted on outside it
enum Outcome {
    /// Nothing to do (e.g. Open event on an already accepted order)
    Noop,
    /// Event referenced a terminal order
    TerminalDrop(OrderStatus),
    /// Plain status transition, no fill
    Transition(OrderStatus),
    /// A fill was recorded on the order
    Fill {
        instrument_id: InstrumentId,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        completed: bool,
        overfill: bool,
    },
    /// Fill event without fill fields
    MalformedFill,
}

/// Applies broker order events to the order table and position ledger
pub struct OrderReconciler {
    store: Arc<OrderStore>,
    ledger: Arc<PositionLedger>,
    guard: Arc<DuplicateGuard>,
    anomalies: AtomicU64,
    dropped_unknown: AtomicU64,
}

impl OrderReconciler {
    pub fn new(
        store: Arc<OrderStore>,
        ledger: Arc<PositionLedger>,
        guard: Arc<DuplicateGuard>,
    ) -> Self {
        Self {
            store,
            ledger,
            guard,
            anomalies: AtomicU64::new(0),
            dropped_unknown: AtomicU64::new(0),
        }
    }

    /// Consistency faults seen so far (overfills, events on terminal orders,
    /// malformed fills)
    pub fn anomaly_count(&self) -> u64 {
        self.anomalies.load(Ordering::Relaxed)
    }

    /// Events dropped because no local order matched the broker id
    pub fn dropped_unknown_count(&self) -> u64 {
        self.dropped_unknown.load(Ordering::Relaxed)
    }

    /// Apply one order update. Infallible by design: a malformed event is
    /// isolated to that event.
    pub fn apply(&self, event: &OrderUpdateEvent) {
        let Some(order_ref) = self.store.resolve_broker_id(&event.order_id) else {
            // Expected for orders not originated by this process
            debug!(
                "[RECON] dropping event for unknown broker order {}",
                event.order_id
            );
            self.dropped_unknown.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let outcome = self.store.update(&order_ref, |order| {
            if order.status.is_terminal() {
                return Outcome::TerminalDrop(order.status);
            }

            match event.status {
                VenueOrderStatus::Open => {
                    if matches!(order.status, OrderStatus::Created | OrderStatus::Submitted) {
                        order.status = OrderStatus::Accepted;
                        order.updated_at = Utc::now();
                        Outcome::Transition(OrderStatus::Accepted)
                    } else {
                        Outcome::Noop
                    }
                }
                VenueOrderStatus::PartiallyFilled | VenueOrderStatus::Complete => {
                    let (Some(fill_quantity), Some(fill_price)) =
                        (event.fill_quantity, event.fill_price)
                    else {
                        return Outcome::MalformedFill;
                    };

                    let remaining = order.remaining_quantity();
                    let overfill = fill_quantity > remaining;
                    let applied = fill_quantity.min(remaining);
                    if applied > Decimal::ZERO {
                        order.record_fill(applied, fill_price);
                    }

                    // Completed iff cumulative == requested, regardless of
                    // what the event claimed
                    let completed = order.is_filled();
                    order.status = if completed {
                        OrderStatus::Completed
                    } else {
                        OrderStatus::PartiallyFilled
                    };
                    order.updated_at = Utc::now();

                    Outcome::Fill {
                        instrument_id: order.instrument_id.clone(),
                        side: order.side,
                        quantity: applied,
                        price: fill_price,
                        completed,
                        overfill,
                    }
                }
                VenueOrderStatus::Rejected => {
                    // Unconditional; prior partial fills stand
                    order.status = OrderStatus::Rejected;
                    order.updated_at = Utc::now();
                    Outcome::Transition(OrderStatus::Rejected)
                }
                VenueOrderStatus::Cancelled => {
                    order.status = OrderStatus::Cancelled;
                    order.updated_at = Utc::now();
                    Outcome::Transition(OrderStatus::Cancelled)
                }
            }
        });

        // Ledger and guard updates happen outside the order-table lock
        match outcome {
            None => {
                // The ref resolved a moment ago; only a concurrent removal
                // could land here
                warn!("[RECON] order {} vanished mid-apply", order_ref);
            }
            Some(Outcome::Noop) => {}
            Some(Outcome::TerminalDrop(status)) => {
                warn!(
                    "[RECON] event {:?} for {} ignored: order already {:?}",
                    event.status, event.order_id, status
                );
                self.anomalies.fetch_add(1, Ordering::Relaxed);
            }
            Some(Outcome::MalformedFill) => {
                error!(
                    "[RECON] fill event for {} missing quantity/price, dropped",
                    event.order_id
                );
                self.anomalies.fetch_add(1, Ordering::Relaxed);
            }
            Some(Outcome::Transition(status)) => {
                info!("[RECON] {} -> {:?}", event.order_id, status);
            }
            Some(Outcome::Fill {
                instrument_id,
                side,
                quantity,
                price,
                completed,
                overfill,
            }) => {
                if overfill {
                    error!(
                        "[RECON] fill on {} exceeds remaining quantity, excess ignored",
                        event.order_id
                    );
                    self.anomalies.fetch_add(1, Ordering::Relaxed);
                }
                if quantity > Decimal::ZERO {
                    self.ledger.apply_fill(&instrument_id, side, quantity, price);
                    self.guard.note_fill(&instrument_id, side);
                }
                if completed {
                    self.guard.note_completed(&instrument_id, side, Utc::now());
                }
                info!(
                    "[RECON] {} filled {} @ {}{}",
                    event.order_id,
                    quantity,
                    price,
                    if completed { " (complete)" } else { "" }
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garuda_core::{Order, OrderIntent, OrderRef};
    use rust_decimal_macros::dec;

    struct Harness {
        store: Arc<OrderStore>,
        ledger: Arc<PositionLedger>,
        guard: Arc<DuplicateGuard>,
        recon: OrderReconciler,
    }

    fn harness() -> Harness {
        let store = Arc::new(OrderStore::new());
        let ledger = Arc::new(PositionLedger::new(dec!(1_000_000)));
        let guard = Arc::new(DuplicateGuard::new());
        let recon = OrderReconciler::new(store.clone(), ledger.clone(), guard.clone());
        Harness {
            store,
            ledger,
            guard,
            recon,
        }
    }

    fn submitted_buy(h: &Harness, qty: Decimal) -> (OrderRef, String) {
        let order = Order::from_intent(&OrderIntent::limit("SBIN-EQ", Side::Buy, qty, dec!(800)));
        let order_ref = order.local_ref;
        h.store.insert(order);
        let broker_id = format!("B-{}", order_ref.simple());
        h.store.acknowledge(&order_ref, &broker_id);
        (order_ref, broker_id)
    }

    #[test]
    fn test_unknown_order_dropped() {
        let h = harness();
        h.recon.apply(&OrderUpdateEvent::fill("GHOST", dec!(1), dec!(100), true));

        assert_eq!(h.recon.dropped_unknown_count(), 1);
        assert_eq!(h.recon.anomaly_count(), 0);
        assert_eq!(h.ledger.cash(), dec!(1_000_000));
    }

    #[test]
    fn test_open_moves_submitted_to_accepted() {
        let h = harness();
        let (order_ref, broker_id) = submitted_buy(&h, dec!(10));

        h.recon.apply(&OrderUpdateEvent::open(&broker_id));
        assert_eq!(h.store.get(&order_ref).unwrap().status, OrderStatus::Accepted);

        // A second Open changes nothing
        h.recon.apply(&OrderUpdateEvent::open(&broker_id));
        assert_eq!(h.store.get(&order_ref).unwrap().status, OrderStatus::Accepted);
        assert_eq!(h.recon.anomaly_count(), 0);
    }

    #[test]
    fn test_partial_then_complete_fill() {
        let h = harness();
        let (order_ref, broker_id) = submitted_buy(&h, dec!(10));

        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(4), dec!(100), false));
        let order = h.store.get(&order_ref).unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.filled_quantity, dec!(4));
        assert_eq!(order.avg_fill_price, Some(dec!(100)));

        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(6), dec!(110), true));
        let order = h.store.get(&order_ref).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.filled_quantity, dec!(10));
        // (4*100 + 6*110) / 10
        assert_eq!(order.avg_fill_price, Some(dec!(106)));

        // Ledger saw both fills
        let pos = h.ledger.position(&InstrumentId::new("SBIN-EQ"));
        assert_eq!(pos.quantity(), dec!(10));
        assert_eq!(pos.average_price(), Some(dec!(106)));
        assert_eq!(h.ledger.cash(), dec!(1_000_000) - dec!(1060));
    }

    #[test]
    fn test_overfill_clamped_and_flagged() {
        let h = harness();
        let (order_ref, broker_id) = submitted_buy(&h, dec!(10));

        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(8), dec!(100), false));
        // 7 more would exceed requested 10: clamp to 2, flag the fault
        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(7), dec!(100), true));

        let order = h.store.get(&order_ref).unwrap();
        assert_eq!(order.filled_quantity, dec!(10));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(h.recon.anomaly_count(), 1);

        // Only the clamped quantity reached the ledger
        let pos = h.ledger.position(&InstrumentId::new("SBIN-EQ"));
        assert_eq!(pos.quantity(), dec!(10));
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        let h = harness();
        let (order_ref, broker_id) = submitted_buy(&h, dec!(10));

        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(10), dec!(100), true));
        assert_eq!(h.store.get(&order_ref).unwrap().status, OrderStatus::Completed);

        // Fills, rejects and cancels after completion are all dropped
        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(5), dec!(90), true));
        h.recon.apply(&OrderUpdateEvent::rejected(&broker_id, "late"));
        h.recon.apply(&OrderUpdateEvent::cancelled(&broker_id));

        let order = h.store.get(&order_ref).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.filled_quantity, dec!(10));
        assert_eq!(h.recon.anomaly_count(), 3);

        // Ledger unchanged by the absorbed events
        let pos = h.ledger.position(&InstrumentId::new("SBIN-EQ"));
        assert_eq!(pos.quantity(), dec!(10));
    }

    #[test]
    fn test_cancel_after_partial_fill_keeps_position() {
        let h = harness();
        let (order_ref, broker_id) = submitted_buy(&h, dec!(10));

        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(4), dec!(100), false));
        h.recon.apply(&OrderUpdateEvent::cancelled(&broker_id));

        let order = h.store.get(&order_ref).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.filled_quantity, dec!(4));

        // No rollback of the applied fills
        let pos = h.ledger.position(&InstrumentId::new("SBIN-EQ"));
        assert_eq!(pos.quantity(), dec!(4));
        assert_eq!(h.ledger.cash(), dec!(1_000_000) - dec!(400));
    }

    #[test]
    fn test_reject_after_partial_fill_keeps_position() {
        let h = harness();
        let (order_ref, broker_id) = submitted_buy(&h, dec!(10));

        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(3), dec!(100), false));
        h.recon
            .apply(&OrderUpdateEvent::rejected(&broker_id, "margin call"));

        assert_eq!(h.store.get(&order_ref).unwrap().status, OrderStatus::Rejected);
        let pos = h.ledger.position(&InstrumentId::new("SBIN-EQ"));
        assert_eq!(pos.quantity(), dec!(3));
    }

    #[test]
    fn test_completion_feeds_duplicate_guard() {
        let h = harness();
        let (_, broker_id) = submitted_buy(&h, dec!(10));

        h.recon
            .apply(&OrderUpdateEvent::fill(&broker_id, dec!(10), dec!(100), true));

        let sbin = InstrumentId::new("SBIN-EQ");
        assert!(h
            .guard
            .suppressed(&sbin, Side::Buy, chrono::Duration::minutes(5), Utc::now()));

        // An opposite-side fill releases the suppression
        let sell = Order::from_intent(&OrderIntent::limit("SBIN-EQ", Side::Sell, dec!(5), dec!(810)));
        let sell_ref = sell.local_ref;
        h.store.insert(sell);
        h.store.acknowledge(&sell_ref, "B-SELL");
        h.recon
            .apply(&OrderUpdateEvent::fill("B-SELL", dec!(5), dec!(810), true));

        assert!(!h
            .guard
            .suppressed(&sbin, Side::Buy, chrono::Duration::minutes(5), Utc::now()));
    }

    #[test]
    fn test_malformed_fill_dropped() {
        let h = harness();
        let (order_ref, broker_id) = submitted_buy(&h, dec!(10));

        let mut event = OrderUpdateEvent::fill(&broker_id, dec!(5), dec!(100), false);
        event.fill_quantity = None;
        h.recon.apply(&event);

        assert_eq!(h.store.get(&order_ref).unwrap().filled_quantity, dec!(0));
        assert_eq!(h.recon.anomaly_count(), 1);
    }
}
