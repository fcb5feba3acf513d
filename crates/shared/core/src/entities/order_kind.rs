use serde::{Deserialize, Serialize};

/// Order kinds the bridge can express at the venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// Execute at current market price
    Market,
    /// Execute at specified price or better
    Limit,
    /// Market order released when price reaches the trigger
    StopMarket,
    /// Limit order released when price reaches the trigger
    StopLimit,
    /// Entry with attached take-profit / stop-loss legs (venue variety "BO")
    Bracket,
    /// Intraday entry with a mandatory stop-loss trigger (venue variety "CO")
    Cover,
}

impl OrderKind {
    /// Kinds that must carry a limit price
    pub fn requires_limit_price(&self) -> bool {
        matches!(
            self,
            OrderKind::Limit | OrderKind::StopLimit | OrderKind::Bracket | OrderKind::Cover
        )
    }

    /// Kinds that must carry a trigger price
    pub fn requires_trigger_price(&self) -> bool {
        matches!(
            self,
            OrderKind::StopMarket | OrderKind::StopLimit | OrderKind::Cover
        )
    }
}
