//! Last-price cache
//!
//! Latest traded price per instrument, written by the tick-stream worker
//! and read by the submission path for margin reference pricing and
//! slippage control. DashMap keeps writers and readers from blocking each
//! other across instruments.

use dashmap::DashMap;
use garuda_core::InstrumentId;
use rust_decimal::Decimal;

#[derive(Default)]
pub struct LastPriceCache {
    prices: DashMap<InstrumentId, Decimal>,
}

impl LastPriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest traded price for an instrument
    pub fn update(&self, instrument_id: &InstrumentId, price: Decimal) {
        self.prices.insert(instrument_id.clone(), price);
    }

    /// Latest known price, if any tick has been seen
    pub fn get(&self, instrument_id: &InstrumentId) -> Option<Decimal> {
        self.prices.get(instrument_id).map(|p| *p)
    }
}
