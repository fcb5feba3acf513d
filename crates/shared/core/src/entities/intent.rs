use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{OrderKind, Side};
use crate::instruments::InstrumentId;

/// Malformed intent errors, surfaced before any Order is created
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("{kind:?} order requires a limit price")]
    MissingLimitPrice { kind: OrderKind },

    #[error("{kind:?} order requires a trigger price")]
    MissingTriggerPrice { kind: OrderKind },

    #[error("bracket order requires bracket parameters")]
    MissingBracketParams,
}

/// Take-profit / stop-loss legs attached to a bracket order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BracketParams {
    /// Take-profit offset from the entry price
    pub squareoff: Decimal,
    /// Stop-loss offset from the entry price
    pub stoploss: Decimal,
    /// Optional trailing stop-loss step
    pub trailing_stoploss: Option<Decimal>,
}

/// An abstract request to buy or sell, before venue-specific encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// The instrument being traded
    pub instrument_id: InstrumentId,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    /// Required for Limit, StopLimit, Bracket and Cover orders
    pub limit_price: Option<Decimal>,
    /// Required for StopMarket, StopLimit and Cover orders
    pub trigger_price: Option<Decimal>,
    /// Required for Bracket orders
    pub bracket: Option<BracketParams>,
}

impl OrderIntent {
    /// Create a market intent
    pub fn market(instrument_id: impl Into<InstrumentId>, side: Side, quantity: Decimal) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            kind: OrderKind::Market,
            quantity,
            limit_price: None,
            trigger_price: None,
            bracket: None,
        }
    }

    /// Create a limit intent
    pub fn limit(
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            kind: OrderKind::Limit,
            quantity,
            limit_price: Some(price),
            trigger_price: None,
            bracket: None,
        }
    }

    /// Create a stop-market intent (released when price reaches the trigger)
    pub fn stop_market(
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        quantity: Decimal,
        trigger: Decimal,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            kind: OrderKind::StopMarket,
            quantity,
            limit_price: None,
            trigger_price: Some(trigger),
            bracket: None,
        }
    }

    /// Create a stop-limit intent
    pub fn stop_limit(
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        trigger: Decimal,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            kind: OrderKind::StopLimit,
            quantity,
            limit_price: Some(price),
            trigger_price: Some(trigger),
            bracket: None,
        }
    }

    /// Create a bracket intent with take-profit / stop-loss legs
    pub fn bracket(
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        params: BracketParams,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            kind: OrderKind::Bracket,
            quantity,
            limit_price: Some(price),
            trigger_price: None,
            bracket: Some(params),
        }
    }

    /// Create a cover intent (entry limit plus mandatory stop-loss trigger)
    pub fn cover(
        instrument_id: impl Into<InstrumentId>,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        trigger: Decimal,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            side,
            kind: OrderKind::Cover,
            quantity,
            limit_price: Some(price),
            trigger_price: Some(trigger),
            bracket: None,
        }
    }

    /// Validate the intent against its kind's price requirements
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveQuantity(self.quantity));
        }
        if self.kind.requires_limit_price() && self.limit_price.is_none() {
            return Err(ValidationError::MissingLimitPrice { kind: self.kind });
        }
        if self.kind.requires_trigger_price() && self.trigger_price.is_none() {
            return Err(ValidationError::MissingTriggerPrice { kind: self.kind });
        }
        if self.kind == OrderKind::Bracket && self.bracket.is_none() {
            return Err(ValidationError::MissingBracketParams);
        }
        Ok(())
    }

    /// Quantity with the side's sign applied
    pub fn signed_quantity(&self) -> Decimal {
        self.side.signed(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_intent_valid() {
        let intent = OrderIntent::market("SBIN-EQ", Side::Buy, dec!(10));
        assert!(intent.validate().is_ok());
        assert_eq!(intent.signed_quantity(), dec!(10));
    }

    #[test]
    fn test_limit_requires_price() {
        let mut intent = OrderIntent::limit("SBIN-EQ", Side::Sell, dec!(5), dec!(800));
        assert!(intent.validate().is_ok());
        assert_eq!(intent.signed_quantity(), dec!(-5));

        intent.limit_price = None;
        assert_eq!(
            intent.validate(),
            Err(ValidationError::MissingLimitPrice {
                kind: OrderKind::Limit
            })
        );
    }

    #[test]
    fn test_stop_requires_trigger() {
        let mut intent = OrderIntent::stop_market("SBIN-EQ", Side::Sell, dec!(5), dec!(790));
        assert!(intent.validate().is_ok());

        intent.trigger_price = None;
        assert_eq!(
            intent.validate(),
            Err(ValidationError::MissingTriggerPrice {
                kind: OrderKind::StopMarket
            })
        );
    }

    #[test]
    fn test_bracket_requires_params() {
        let params = BracketParams {
            squareoff: dec!(10),
            stoploss: dec!(5),
            trailing_stoploss: None,
        };
        let mut intent = OrderIntent::bracket("SBIN-EQ", Side::Buy, dec!(1), dec!(800), params);
        assert!(intent.validate().is_ok());

        intent.bracket = None;
        assert_eq!(intent.validate(), Err(ValidationError::MissingBracketParams));
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let intent = OrderIntent::market("SBIN-EQ", Side::Buy, dec!(0));
        assert_eq!(
            intent.validate(),
            Err(ValidationError::NonPositiveQuantity(dec!(0)))
        );
    }
}
