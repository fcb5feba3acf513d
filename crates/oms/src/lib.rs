//! Garuda Order Management
//!
//! The OMS sits between strategies and the venue gateway, responsible for:
//! - **Pre-trade risk**: margin sufficiency, position limits, duplicate-signal
//!   suppression, slippage control
//! - **Order routing**: mapping abstract intents to the venue's wire dialect
//!   and submitting them through the `BrokerGateway` boundary
//! - **Reconciliation**: applying the venue's pushed order events to local
//!   order and position state
//! - **Position ledger**: the authoritative in-memory record of cash and
//!   per-instrument positions
//!
//! ## Architecture
//!
//! ```text
//! Strategy ──► intent ──► ┌─────────────────────────────────────────┐
//!                         │                  OMS                    │
//!                         │  ┌───────────────────────────────────┐  │
//!                         │  │   RiskGate                        │  │
//!                         │  │   - margin / position limits      │  │
//!                         │  │   - duplicate suppression         │  │
//!                         │  │   - market→limit slippage control │  │
//!                         │  └───────────────┬───────────────────┘  │
//!                         │                  │ accepted intent      │
//!                         │  ┌───────────────▼───────────────────┐  │
//!                         │  │   OrderRouter                     │  │
//!                         │  │   - kind → variety/ordertype      │  │
//!                         │  │   - OrderStore bookkeeping        │  │
//!                         │  └───────────────┬───────────────────┘  │
//!                         └──────────────────┼──────────────────────┘
//!                                            │ place_order
//! BrokerGateway ◄────────────────────────────┘
//!        │
//!        │ order update stream (async)
//!        ▼
//!   OrderReconciler ──► OrderStore + PositionLedger
//! ```
//!
//! The submission path and the reconciler run on different tasks and share
//! only the `OrderStore` and `PositionLedger`, each guarded by a single
//! mutex held for one read/update at a time and never across the network
//! boundary.

pub mod error;
pub mod ledger;
pub mod market;
pub mod orders;
pub mod reconciler;
pub mod risk;
pub mod router;

// Re-export main types
pub use error::{CancelError, RejectReason, SubmitError};
pub use ledger::PositionLedger;
pub use market::LastPriceCache;
pub use orders::OrderStore;
pub use reconciler::OrderReconciler;
pub use risk::{DuplicateGuard, RiskConfig, RiskDecision, RiskGate};
pub use router::{OrderRouter, RouterConfig};
