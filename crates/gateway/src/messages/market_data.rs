//! Market data message types

use chrono::{DateTime, Utc};
use garuda_core::InstrumentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single trade tick from the venue's market-data feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMessage {
    pub instrument_id: InstrumentId,
    /// Last traded price
    pub price: Decimal,
    /// Last traded quantity
    pub quantity: Decimal,
    /// Exchange timestamp of the trade
    pub timestamp: DateTime<Utc>,
}

impl TickMessage {
    pub fn new(
        instrument_id: impl Into<InstrumentId>,
        price: Decimal,
        quantity: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            price,
            quantity,
            timestamp,
        }
    }

    /// Get the notional value of the tick
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}
