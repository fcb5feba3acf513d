//! Garuda Ports
//!
//! Port definitions (traits) for the Garuda broker bridge.
//! These define the boundaries between domain logic and infrastructure:
//! the strategy engine depends on `Broker`, never on a concrete session.

mod broker;
mod error;
mod instruments;

pub use broker::Broker;
pub use error::{CancelError, RejectReason, SubmitError};
pub use instruments::InstrumentLookup;
