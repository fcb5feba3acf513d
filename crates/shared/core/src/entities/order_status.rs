use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Transitions run Created → Submitted → Accepted → PartiallyFilled →
/// Completed, with Rejected/Cancelled as alternate terminal exits. Terminal
/// states are absorbing: no event moves an order out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Order created locally, not yet handed to the venue
    Created,
    /// Venue acknowledged receipt and assigned a broker order id
    Submitted,
    /// Venue accepted the order onto its book
    Accepted,
    /// Some quantity filled, more outstanding
    PartiallyFilled,
    /// Entire requested quantity filled
    Completed,
    /// Rejected pre-trade or by the venue
    Rejected,
    /// Cancelled at the venue
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Rejected | OrderStatus::Cancelled
        )
    }

    /// Returns true if the order is still live at the venue
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderStatus::Submitted | OrderStatus::Accepted | OrderStatus::PartiallyFilled
        )
    }
}
