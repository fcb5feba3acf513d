//! Garuda Core Domain
//!
//! Pure domain types for the Garuda broker bridge.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod instruments;

// Re-export commonly used types at crate root
pub use entities::{
    BracketParams, Order, OrderIntent, OrderKind, OrderRef, OrderStatus, Position, Side,
    ValidationError,
};
pub use instruments::{ExchangeSegment, InstrumentId, InstrumentMeta};
