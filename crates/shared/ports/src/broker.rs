use async_trait::async_trait;
use garuda_core::{InstrumentId, OrderIntent, OrderRef, Position};
use rust_decimal::Decimal;

use crate::error::{CancelError, SubmitError};

/// The broker capability set exposed to strategies.
///
/// Strategies depend on this trait only; the concrete session object is
/// constructed by the composition root and passed in by reference. Both
/// `submit` and `cancel` block on the outbound venue call with no implicit
/// timeout; imposing one is the caller's responsibility.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Run pre-trade checks and submit the intent to the venue.
    ///
    /// Returns the local order reference; the order's further lifecycle is
    /// driven by the venue's event stream.
    async fn submit(&self, intent: OrderIntent) -> Result<OrderRef, SubmitError>;

    /// Request cancellation at the venue, fire-and-forget.
    ///
    /// Local state changes only when the Cancelled event arrives through
    /// reconciliation.
    async fn cancel(&self, order_ref: OrderRef) -> Result<(), CancelError>;

    /// Current position for an instrument (flat if never traded)
    fn position_of(&self, instrument_id: &InstrumentId) -> Position;

    /// Cash available for new orders
    fn cash_available(&self) -> Decimal;
}
