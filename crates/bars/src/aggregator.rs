use chrono::{DateTime, Utc};
use garuda_core::InstrumentId;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::bar::{Bar, BarInterval};

/// Receives completed bars as windows close
pub trait BarSink: Send {
    fn publish(&mut self, bar: Bar);
}

impl<F> BarSink for F
where
    F: FnMut(Bar) + Send,
{
    fn publish(&mut self, bar: Bar) {
        self(bar)
    }
}

/// Aggregates one instrument's tick stream into fixed-interval bars.
///
/// The first tick ever received opens the first bar; there is no bar before
/// any tick arrives. A tick at or past the open window's end emits that bar
/// and seeds the next one; a tick inside the window folds in. Windows
/// without ticks emit nothing.
pub struct BarAggregator {
    instrument_id: InstrumentId,
    interval: BarInterval,
    current: Option<Bar>,
    sink: Box<dyn BarSink>,
}

impl BarAggregator {
    pub fn new(
        instrument_id: impl Into<InstrumentId>,
        interval: BarInterval,
        sink: impl BarSink + 'static,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            interval,
            current: None,
            sink: Box::new(sink),
        }
    }

    /// The instrument this aggregator serves
    pub fn instrument_id(&self) -> &InstrumentId {
        &self.instrument_id
    }

    /// The open (mutable) bar, if any tick has arrived yet
    pub fn current(&self) -> Option<&Bar> {
        self.current.as_ref()
    }

    /// Feed one tick into the grid
    pub fn on_tick(&mut self, timestamp: DateTime<Utc>, price: Decimal, volume: Decimal) {
        let Some(bar) = self.current.as_mut() else {
            self.open_window(timestamp, price, volume);
            return;
        };

        if timestamp < bar.start {
            // The feed replayed something older than the open window
            warn!(
                "[BARS] {} dropping out-of-order tick at {} (window starts {})",
                self.instrument_id, timestamp, bar.start
            );
            return;
        }

        let window_end = bar.start + self.interval.width();
        if timestamp >= window_end {
            let completed = self.current.take();
            if let Some(completed) = completed {
                debug_assert!(completed.is_coherent());
                self.sink.publish(completed);
            }
            self.open_window(timestamp, price, volume);
        } else {
            bar.update(price, volume);
        }
    }

    fn open_window(&mut self, timestamp: DateTime<Utc>, price: Decimal, volume: Decimal) {
        let start = self.interval.floor(timestamp);
        debug!("[BARS] {} opening window at {}", self.instrument_id, start);
        self.current = Some(Bar::seed(self.instrument_id.clone(), start, price, volume));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    fn collector() -> (Arc<Mutex<Vec<Bar>>>, impl BarSink + 'static) {
        let bars = Arc::new(Mutex::new(Vec::new()));
        let sink_bars = bars.clone();
        (bars, move |bar: Bar| sink_bars.lock().unwrap().push(bar))
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, h, m, s).unwrap()
    }

    #[test]
    fn test_five_minute_window_sequence() {
        let (bars, sink) = collector();
        let mut agg = BarAggregator::new("SBIN-EQ", BarInterval::minutes(5), sink);

        agg.on_tick(at(10, 0, 0), dec!(100), dec!(1));
        agg.on_tick(at(10, 2, 0), dec!(105), dec!(1));
        agg.on_tick(at(10, 4, 59), dec!(95), dec!(1));
        // Lands exactly on the boundary: closes [10:00, 10:05) and opens the next window
        agg.on_tick(at(10, 5, 0), dec!(110), dec!(1));

        let emitted = bars.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        let bar = &emitted[0];
        assert_eq!(bar.start, at(10, 0, 0));
        assert_eq!(bar.open, dec!(100));
        assert_eq!(bar.high, dec!(105));
        assert_eq!(bar.low, dec!(95));
        assert_eq!(bar.close, dec!(95));
        assert_eq!(bar.volume, dec!(3));

        // The boundary tick seeded the new window
        let open = agg.current().unwrap();
        assert_eq!(open.start, at(10, 5, 0));
        assert_eq!(open.open, dec!(110));
        assert_eq!(open.high, dec!(110));
        assert_eq!(open.low, dec!(110));
    }

    #[test]
    fn test_no_bar_before_first_tick() {
        let (bars, sink) = collector();
        let agg = BarAggregator::new("SBIN-EQ", BarInterval::minutes(5), sink);
        assert!(agg.current().is_none());
        assert!(bars.lock().unwrap().is_empty());
    }

    #[test]
    fn test_gap_windows_emit_nothing() {
        let (bars, sink) = collector();
        let mut agg = BarAggregator::new("SBIN-EQ", BarInterval::minutes(5), sink);

        agg.on_tick(at(10, 0, 30), dec!(100), dec!(1));
        // Next tick lands three windows later; [10:05) and [10:10) stay empty
        agg.on_tick(at(10, 17, 0), dec!(103), dec!(2));

        let emitted = bars.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].start, at(10, 0, 0));

        let open = agg.current().unwrap();
        assert_eq!(open.start, at(10, 15, 0));
        assert_eq!(open.open, dec!(103));
    }

    #[test]
    fn test_first_tick_window_start_is_truncated() {
        let (_bars, sink) = collector();
        let mut agg = BarAggregator::new("SBIN-EQ", BarInterval::minutes(5), sink);

        agg.on_tick(at(10, 3, 17), dec!(100), dec!(1));
        assert_eq!(agg.current().unwrap().start, at(10, 0, 0));
    }

    #[test]
    fn test_out_of_order_tick_dropped() {
        let (bars, sink) = collector();
        let mut agg = BarAggregator::new("SBIN-EQ", BarInterval::minutes(5), sink);

        agg.on_tick(at(10, 5, 0), dec!(100), dec!(1));
        // Older than the open window - dropped, no state change
        agg.on_tick(at(10, 2, 0), dec!(42), dec!(9));

        assert!(bars.lock().unwrap().is_empty());
        let open = agg.current().unwrap();
        assert_eq!(open.low, dec!(100));
        assert_eq!(open.volume, dec!(1));
    }

    #[test]
    fn test_volume_accumulates_within_window() {
        let (_bars, sink) = collector();
        let mut agg = BarAggregator::new("SBIN-EQ", BarInterval::minutes(1), sink);

        agg.on_tick(at(10, 0, 1), dec!(100), dec!(10));
        agg.on_tick(at(10, 0, 20), dec!(101), dec!(15));
        agg.on_tick(at(10, 0, 45), dec!(99), dec!(5));

        assert_eq!(agg.current().unwrap().volume, dec!(30));
    }

    #[test]
    fn test_consecutive_windows() {
        let (bars, sink) = collector();
        let mut agg = BarAggregator::new("SBIN-EQ", BarInterval::minutes(1), sink);

        agg.on_tick(at(10, 0, 10), dec!(100), dec!(1));
        agg.on_tick(at(10, 1, 10), dec!(101), dec!(1));
        agg.on_tick(at(10, 2, 10), dec!(102), dec!(1));

        let emitted = bars.lock().unwrap();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].start, at(10, 0, 0));
        assert_eq!(emitted[0].close, dec!(100));
        assert_eq!(emitted[1].start, at(10, 1, 0));
        assert_eq!(emitted[1].close, dec!(101));
        assert!(emitted.iter().all(|b| b.is_coherent()));
    }
}
