//! Position Ledger
//!
//! The authoritative in-memory record of cash and per-instrument positions.
//! Mutated only by confirmed fills through `apply_fill`; each call represents
//! exactly one real fill, so callers (the reconciler) must invoke it exactly
//! once per fill event. One mutex guards cash and positions together, held
//! only for the duration of a single update.

use std::collections::HashMap;
use std::sync::Mutex;

use garuda_core::{InstrumentId, Position, Side};
use garuda_gateway::BrokerPosition;
use log::{error, info, warn};
use rust_decimal::Decimal;

struct LedgerInner {
    cash: Decimal,
    positions: HashMap<InstrumentId, Position>,
}

/// Cash and position state, shared between the submission path, the
/// reconciler and strategy reads
pub struct PositionLedger {
    inner: Mutex<LedgerInner>,
}

impl PositionLedger {
    pub fn new(starting_cash: Decimal) -> Self {
        Self {
            inner: Mutex::new(LedgerInner {
                cash: starting_cash,
                positions: HashMap::new(),
            }),
        }
    }

    /// Cash available for new orders
    pub fn cash(&self) -> Decimal {
        self.inner.lock().unwrap().cash
    }

    /// Position for an instrument; flat if never traded
    pub fn position(&self, instrument_id: &InstrumentId) -> Position {
        self.inner
            .lock()
            .unwrap()
            .positions
            .get(instrument_id)
            .copied()
            .unwrap_or_default()
    }

    /// Snapshot of all non-flat positions
    pub fn positions(&self) -> Vec<(InstrumentId, Position)> {
        self.inner
            .lock()
            .unwrap()
            .positions
            .iter()
            .filter(|(_, p)| !p.is_flat())
            .map(|(id, p)| (id.clone(), *p))
            .collect()
    }

    /// Apply one confirmed fill: update the instrument position and move
    /// cash by the fill notional (debit on buys, credit on sells).
    ///
    /// Negative cash after a fill is a ledger inconsistency: fatal in debug
    /// builds, an error log in release, never silently corrected.
    pub fn apply_fill(
        &self,
        instrument_id: &InstrumentId,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) {
        let mut inner = self.inner.lock().unwrap();

        let position = inner.positions.entry(instrument_id.clone()).or_default();
        position.apply_fill(side, quantity, price);

        let notional = quantity * price;
        match side {
            Side::Buy => inner.cash -= notional,
            Side::Sell => inner.cash += notional,
        }

        if inner.cash < Decimal::ZERO {
            debug_assert!(
                false,
                "ledger inconsistency: cash went negative ({}) after {} {} {} @ {}",
                inner.cash, side, quantity, instrument_id, price
            );
            error!(
                "[LEDGER] cash went negative ({}) after {} {} {} @ {}",
                inner.cash, side, quantity, instrument_id, price
            );
        }
    }

    /// Adopt broker-authoritative cash and positions after a reconnect.
    ///
    /// Every adjustment is logged; nothing is adopted silently. In-memory
    /// state for instruments the broker does not report is left untouched
    /// (the broker omits flat positions).
    pub fn resync(&self, cash: Decimal, broker_positions: &[BrokerPosition]) {
        let mut inner = self.inner.lock().unwrap();

        if inner.cash != cash {
            warn!(
                "[LEDGER] resync: cash {} -> {} (broker authoritative)",
                inner.cash, cash
            );
            inner.cash = cash;
        }

        for bp in broker_positions {
            let local = inner
                .positions
                .get(&bp.instrument_id)
                .copied()
                .unwrap_or_default();
            let remote = Position::new(bp.quantity, bp.avg_price);
            if local != remote {
                warn!(
                    "[LEDGER] resync: {} position {} -> {} (broker authoritative)",
                    bp.instrument_id,
                    local.quantity(),
                    remote.quantity()
                );
                inner.positions.insert(bp.instrument_id.clone(), remote);
            }
        }

        info!(
            "[LEDGER] resync complete: cash={}, {} broker positions",
            inner.cash,
            broker_positions.len()
        );
    }
}
