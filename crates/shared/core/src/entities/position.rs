use rust_decimal::Decimal;
use rust_decimal::prelude::Signed;
use serde::{Deserialize, Serialize};

use super::Side;

/// A per-instrument position: signed quantity plus volume-weighted entry price.
///
/// Positive quantity is long, negative is short. The average price is
/// undefined at zero quantity; `average_price` returns `None` there and the
/// field itself is private to keep it that way. Positions are owned by the
/// position ledger and mutated only through fills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    quantity: Decimal,
    avg_price: Decimal,
}

impl Position {
    /// Reconstruct a position from broker-reported state
    pub fn new(quantity: Decimal, avg_price: Decimal) -> Self {
        Self {
            quantity,
            avg_price: if quantity.is_zero() {
                Decimal::ZERO
            } else {
                avg_price
            },
        }
    }

    /// Signed quantity (positive = long, negative = short)
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Volume-weighted average entry price, `None` when flat
    pub fn average_price(&self) -> Option<Decimal> {
        if self.quantity.is_zero() {
            None
        } else {
            Some(self.avg_price)
        }
    }

    /// Returns true if the position is flat
    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Apply one fill to this position.
    ///
    /// Adding to the position re-weights the average price. Reducing leaves
    /// the average untouched until the position flips sign, at which point
    /// the average resets to the fill price and the size becomes the
    /// residual opposite quantity.
    pub fn apply_fill(&mut self, side: Side, quantity: Decimal, price: Decimal) {
        let signed_qty = side.signed(quantity);
        let new_quantity = self.quantity + signed_qty;

        if new_quantity.is_zero() {
            // Flat, average is undefined again
            self.avg_price = Decimal::ZERO;
        } else if (self.quantity >= Decimal::ZERO && signed_qty > Decimal::ZERO)
            || (self.quantity <= Decimal::ZERO && signed_qty < Decimal::ZERO)
        {
            // Adding to position - weighted average
            let total_cost = self.quantity.abs() * self.avg_price + quantity * price;
            self.avg_price = total_cost / new_quantity.abs();
        } else if new_quantity.signum() != self.quantity.signum() {
            // Flipped sides - new avg price is the fill price
            self.avg_price = price;
        }
        // Reducing without flipping keeps the average unchanged

        self.quantity = new_quantity;
    }
}
