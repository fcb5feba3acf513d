use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{BracketParams, OrderIntent, OrderKind, OrderStatus, Side};
use crate::instruments::InstrumentId;

/// Locally generated order reference, stable for the order's lifetime
pub type OrderRef = Uuid;

/// Full order details
///
/// The broker order id is bound exactly once, when the venue acknowledges
/// the submission, and is immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub local_ref: OrderRef,
    /// Venue-assigned identifier, present after acknowledgment
    pub broker_order_id: Option<String>,
    /// The instrument being traded
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    /// Required for Limit, StopLimit, Bracket and Cover orders
    pub limit_price: Option<Decimal>,
    /// Required for StopMarket, StopLimit and Cover orders
    pub trigger_price: Option<Decimal>,
    /// Present for Bracket orders
    pub bracket: Option<BracketParams>,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
    /// Volume-weighted average fill price, defined only when fills exist
    pub avg_fill_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order from an intent, in status Created
    pub fn from_intent(intent: &OrderIntent) -> Self {
        let now = Utc::now();
        Self {
            local_ref: Uuid::new_v4(),
            broker_order_id: None,
            instrument_id: intent.instrument_id.clone(),
            side: intent.side,
            kind: intent.kind,
            quantity: intent.quantity,
            limit_price: intent.limit_price,
            trigger_price: intent.trigger_price,
            bracket: intent.bracket,
            status: OrderStatus::Created,
            filled_quantity: Decimal::ZERO,
            avg_fill_price: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns remaining quantity to be filled
    pub fn remaining_quantity(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    /// Returns true if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_quantity >= self.quantity
    }

    /// Fold one fill into the cumulative quantity and the VWAP.
    ///
    /// The caller must have clamped `qty` to `remaining_quantity()`; this
    /// only does the arithmetic.
    pub fn record_fill(&mut self, qty: Decimal, price: Decimal) {
        debug_assert!(qty <= self.remaining_quantity());
        let prior_notional = self
            .avg_fill_price
            .map(|avg| avg * self.filled_quantity)
            .unwrap_or(Decimal::ZERO);
        self.filled_quantity += qty;
        if self.filled_quantity > Decimal::ZERO {
            self.avg_fill_price = Some((prior_notional + price * qty) / self.filled_quantity);
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buy_order(qty: Decimal) -> Order {
        Order::from_intent(&OrderIntent::limit("SBIN-EQ", Side::Buy, qty, dec!(800)))
    }

    #[test]
    fn test_new_order_is_created_and_unfilled() {
        let order = buy_order(dec!(10));
        assert_eq!(order.status, OrderStatus::Created);
        assert!(order.broker_order_id.is_none());
        assert_eq!(order.filled_quantity, dec!(0));
        assert!(order.avg_fill_price.is_none());
        assert_eq!(order.remaining_quantity(), dec!(10));
    }

    #[test]
    fn test_record_fill_vwap() {
        let mut order = buy_order(dec!(10));

        order.record_fill(dec!(4), dec!(100));
        assert_eq!(order.filled_quantity, dec!(4));
        assert_eq!(order.avg_fill_price, Some(dec!(100)));

        // (4*100 + 6*110) / 10 = 106
        order.record_fill(dec!(6), dec!(110));
        assert_eq!(order.filled_quantity, dec!(10));
        assert_eq!(order.avg_fill_price, Some(dec!(106)));
        assert!(order.is_filled());
    }

    #[test]
    fn test_remaining_quantity() {
        let mut order = buy_order(dec!(10));
        order.record_fill(dec!(3), dec!(99));
        assert_eq!(order.remaining_quantity(), dec!(7));
        assert!(!order.is_filled());
    }
}
