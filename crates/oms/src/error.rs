//! OMS error vocabulary
//!
//! The submission/cancellation error types live in `garuda-ports` so the
//! strategy-facing `Broker` trait can name them without depending on this
//! crate; they are re-exported here for convenience.

pub use garuda_ports::{CancelError, RejectReason, SubmitError};

pub type Result<T, E = SubmitError> = std::result::Result<T, E>;
