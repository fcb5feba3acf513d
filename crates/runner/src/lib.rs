//! Garuda Runner
//!
//! The composition root: builds a `TradingSession` from a `BrokerGateway`,
//! wires the OMS and bar aggregation to the venue's two push streams, and
//! exposes the `Broker` capability set to strategies.
//!
//! ```rust,ignore
//! use garuda_runner::{InstrumentTable, SessionConfig, TradingSession};
//!
//! let session = TradingSession::connect(
//!     SessionConfig::default(),
//!     gateway,
//!     Arc::new(instruments),
//! ).await?;
//!
//! let order_ref = session.submit(OrderIntent::market("SBIN-EQ", Side::Buy, dec!(1))).await?;
//! let mut bars = session.subscribe_bars();
//! ```

mod config;
mod instruments;
mod session;
mod streams;

pub use config::SessionConfig;
pub use instruments::InstrumentTable;
pub use session::TradingSession;
