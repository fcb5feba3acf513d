//! Garuda Bars
//!
//! Converts a trade tick stream into append-only OHLCV bars on a fixed time
//! grid. One aggregator per instrument; completed bars are emitted through a
//! registered sink the moment a tick crosses the window boundary. Windows
//! with no ticks produce no bars - the aggregator never synthesizes.

mod aggregator;
mod bar;

pub use aggregator::{BarAggregator, BarSink};
pub use bar::{Bar, BarInterval};
