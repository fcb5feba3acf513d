//! Error vocabulary shared across the broker boundary

use garuda_core::{InstrumentId, OrderRef, OrderStatus, Side, ValidationError};
use rust_decimal::Decimal;
use thiserror::Error;

/// A named pre-trade check failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    #[error("insufficient margin: required {required}, available {available}")]
    InsufficientMargin {
        required: Decimal,
        available: Decimal,
    },

    #[error(
        "position limit exceeded for {instrument_id}: current={current}, requested={requested}, limit={limit}"
    )]
    PositionLimitExceeded {
        instrument_id: InstrumentId,
        current: Decimal,
        requested: Decimal,
        limit: Decimal,
    },

    #[error("duplicate signal for {instrument_id} {side}: an order already completed for this signal")]
    DuplicateSignal {
        instrument_id: InstrumentId,
        side: Side,
    },

    #[error("no reference price available for {instrument_id}")]
    NoReferencePrice { instrument_id: InstrumentId },
}

/// Submission failures surfaced to the strategy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Malformed intent; no order was created
    #[error("invalid intent: {0}")]
    Validation(#[from] ValidationError),

    /// A pre-trade check failed; the order exists in status Rejected
    #[error("order rejected: {reason}")]
    Rejected {
        order_ref: OrderRef,
        reason: RejectReason,
    },

    /// The outbound venue call failed; the order was marked Rejected locally
    /// and is never retried
    #[error("submission transport failure: {message}")]
    Transport {
        order_ref: OrderRef,
        message: String,
    },
}

/// Cancellation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CancelError {
    #[error("unknown order {0}")]
    UnknownOrder(OrderRef),

    #[error("order {0} has no broker id yet; nothing to cancel at the venue")]
    NotAcknowledged(OrderRef),

    #[error("order {order_ref} is already {status:?}")]
    AlreadyTerminal {
        order_ref: OrderRef,
        status: OrderStatus,
    },

    #[error("cancel transport failure: {0}")]
    Transport(String),
}
