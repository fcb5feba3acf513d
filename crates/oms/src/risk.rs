//! Pre-trade risk gate
//!
//! Runs the fixed check sequence - margin, position limit, duplicate
//! signal - short-circuiting on the first failure, then applies slippage
//! control to market intents. The gate is side-effect free: it never
//! mutates positions and never submits orders, it only produces a decision.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use garuda_core::{InstrumentId, InstrumentMeta, OrderIntent, OrderKind, Position, Side};
use garuda_ports::RejectReason;
use log::{info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Risk gate configuration
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// Ticks added to (buys) or subtracted from (sells) the last price when
    /// rewriting a market intent into a limit
    pub slippage_ticks: Decimal,
    /// Tick size used when instrument metadata is unavailable
    pub default_tick_size: Decimal,
    /// How long a completed (instrument, side) signal suppresses
    /// resubmission; zero disables the duplicate check
    pub duplicate_window: Duration,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            slippage_ticks: dec!(5),
            default_tick_size: dec!(0.05),
            duplicate_window: Duration::minutes(5),
        }
    }
}

/// Outcome of the pre-trade checks
#[derive(Debug, Clone, PartialEq)]
pub enum RiskDecision {
    /// Intent passed; `adjusted` marks a slippage-control rewrite
    Accept { intent: OrderIntent, adjusted: bool },
    /// A named check failed
    Reject(RejectReason),
}

impl RiskDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RiskDecision::Accept { .. })
    }
}

/// Tracks recently completed (instrument, side) signals to suppress
/// duplicate submissions.
///
/// An entry is recorded when an order completes and cleared by the first
/// opposite-side fill; entries also expire after the configured window.
/// Shared between the risk gate (reads) and the reconciler (writes).
#[derive(Default)]
pub struct DuplicateGuard {
    completions: Mutex<HashMap<(InstrumentId, Side), DateTime<Utc>>>,
}

impl DuplicateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an (instrument, side) order reached Completed
    pub fn note_completed(&self, instrument_id: &InstrumentId, side: Side, at: DateTime<Utc>) {
        self.completions
            .lock()
            .unwrap()
            .insert((instrument_id.clone(), side), at);
    }

    /// A fill on `side` releases the suppression of the opposite side
    pub fn note_fill(&self, instrument_id: &InstrumentId, side: Side) {
        self.completions
            .lock()
            .unwrap()
            .remove(&(instrument_id.clone(), side.opposite()));
    }

    /// Forget all recorded completions
    pub fn reset(&self) {
        self.completions.lock().unwrap().clear();
    }

    /// Is (instrument, side) currently suppressed?
    pub fn suppressed(
        &self,
        instrument_id: &InstrumentId,
        side: Side,
        window: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        if window <= Duration::zero() {
            return false;
        }
        let mut completions = self.completions.lock().unwrap();
        let key = (instrument_id.clone(), side);
        match completions.get(&key) {
            Some(at) if now - *at <= window => true,
            Some(_) => {
                // Expired, drop the stale entry
                completions.remove(&key);
                false
            }
            None => false,
        }
    }
}

/// Pre-trade risk checks and slippage control
pub struct RiskGate {
    config: RiskConfig,
    guard: std::sync::Arc<DuplicateGuard>,
}

impl RiskGate {
    pub fn new(config: RiskConfig) -> Self {
        Self {
            config,
            guard: std::sync::Arc::new(DuplicateGuard::new()),
        }
    }

    /// The duplicate guard, shared with the reconciler which feeds it
    pub fn guard(&self) -> std::sync::Arc<DuplicateGuard> {
        self.guard.clone()
    }

    /// Run the checks in fixed order, short-circuiting on first failure
    pub fn evaluate(
        &self,
        intent: &OrderIntent,
        current_position: &Position,
        available_cash: Decimal,
        meta: Option<&InstrumentMeta>,
        last_price: Option<Decimal>,
    ) -> RiskDecision {
        // 1. Margin check against the reference price
        let reference = match intent.limit_price.or(last_price) {
            Some(price) => price,
            None => {
                warn!(
                    "[RISK REJECTED] {} {}: no reference price",
                    intent.instrument_id, intent.side
                );
                return RiskDecision::Reject(RejectReason::NoReferencePrice {
                    instrument_id: intent.instrument_id.clone(),
                });
            }
        };
        let required = intent.quantity * reference;
        if required > available_cash {
            warn!(
                "[RISK REJECTED] {} {}: margin required {} > available {}",
                intent.instrument_id, intent.side, required, available_cash
            );
            return RiskDecision::Reject(RejectReason::InsufficientMargin {
                required,
                available: available_cash,
            });
        }

        // 2. Position limit against the instrument's lot size
        match meta {
            Some(meta) => {
                let new_position = current_position.quantity() + intent.signed_quantity();
                if new_position.abs() > meta.lot_size {
                    warn!(
                        "[RISK REJECTED] {} {}: position {} would exceed limit {}",
                        intent.instrument_id, intent.side, new_position, meta.lot_size
                    );
                    return RiskDecision::Reject(RejectReason::PositionLimitExceeded {
                        instrument_id: intent.instrument_id.clone(),
                        current: current_position.quantity(),
                        requested: intent.signed_quantity(),
                        limit: meta.lot_size,
                    });
                }
            }
            None => {
                warn!(
                    "[RISK] no metadata for {}, skipping position limit check",
                    intent.instrument_id
                );
            }
        }

        // 3. Duplicate-signal suppression
        if self.guard.suppressed(
            &intent.instrument_id,
            intent.side,
            self.config.duplicate_window,
            Utc::now(),
        ) {
            warn!(
                "[RISK REJECTED] {} {}: duplicate signal within suppression window",
                intent.instrument_id, intent.side
            );
            return RiskDecision::Reject(RejectReason::DuplicateSignal {
                instrument_id: intent.instrument_id.clone(),
                side: intent.side,
            });
        }

        // 4. Slippage control: rewrite market intents into tick-rounded limits
        if intent.kind == OrderKind::Market {
            // reference == last price here, market intents carry no limit
            let tick = meta
                .map(|m| m.tick_size)
                .filter(|t| *t > Decimal::ZERO)
                .unwrap_or(self.config.default_tick_size);
            let raw = match intent.side {
                Side::Buy => reference + tick * self.config.slippage_ticks,
                Side::Sell => reference - tick * self.config.slippage_ticks,
            };
            let limit = (raw / tick).round() * tick;

            let mut adjusted = intent.clone();
            adjusted.kind = OrderKind::Limit;
            adjusted.limit_price = Some(limit);

            info!(
                "[RISK] converted MARKET {} {} to LIMIT @ {}",
                intent.side, intent.instrument_id, limit
            );
            return RiskDecision::Accept {
                intent: adjusted,
                adjusted: true,
            };
        }

        RiskDecision::Accept {
            intent: intent.clone(),
            adjusted: false,
        }
    }
}
