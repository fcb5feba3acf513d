use chrono::{DateTime, Duration, Utc};
use garuda_core::InstrumentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Width of the bar grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarInterval {
    seconds: i64,
}

impl BarInterval {
    pub fn seconds(seconds: i64) -> Self {
        debug_assert!(seconds > 0);
        Self { seconds }
    }

    pub fn minutes(minutes: i64) -> Self {
        Self::seconds(minutes * 60)
    }

    /// Truncate a timestamp down to the interval grid
    pub fn floor(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let rem = ts.timestamp().rem_euclid(self.seconds);
        ts - Duration::seconds(rem) - Duration::nanoseconds(i64::from(ts.timestamp_subsec_nanos()))
    }

    /// Grid width as a chrono duration
    pub fn width(&self) -> Duration {
        Duration::seconds(self.seconds)
    }
}

/// One fixed-width OHLCV window
///
/// Mutable while its window is open, immutable once emitted. Within an open
/// window `high >= max(open, close)`, `low <= min(open, close)` and volume
/// never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub instrument_id: InstrumentId,
    /// Window-start timestamp on the interval grid
    pub start: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    /// Open a new bar seeded with its first tick
    pub fn seed(
        instrument_id: InstrumentId,
        start: DateTime<Utc>,
        price: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            instrument_id,
            start,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }

    /// Fold a tick into the open bar
    pub fn update(&mut self, price: Decimal, volume: Decimal) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += volume;
    }

    /// OHLC ordering invariant, checked by tests and debug builds
    pub fn is_coherent(&self) -> bool {
        self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume >= Decimal::ZERO
    }
}
