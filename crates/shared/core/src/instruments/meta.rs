use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExchangeSegment, InstrumentId};

/// Venue metadata for a tradeable instrument
///
/// `token` is the venue's numeric identifier for the symbol, required in
/// every order payload. `lot_size` doubles as the per-instrument position
/// ceiling for the pre-trade limit check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentMeta {
    pub symbol: String,
    pub token: String,
    pub exchange: ExchangeSegment,
    pub lot_size: Decimal,
    pub tick_size: Decimal,
}

impl InstrumentMeta {
    pub fn new(
        symbol: impl Into<String>,
        token: impl Into<String>,
        exchange: ExchangeSegment,
        lot_size: Decimal,
        tick_size: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            token: token.into(),
            exchange,
            lot_size,
            tick_size,
        }
    }

    /// Instrument id for this metadata entry
    pub fn id(&self) -> InstrumentId {
        InstrumentId::new(self.symbol.clone())
    }
}
