//! Order message types for the venue wire dialect
//!
//! Field names and enum spellings are pinned to the venue's JSON API
//! (`tradingsymbol`, `symboltoken`, `trailingStoploss`, ...); tests below
//! guard them against accidental renames.

use chrono::{DateTime, Utc};
use garuda_core::ExchangeSegment;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction direction on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

/// Venue order variety: the order's venue-specific category, distinct from
/// its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderVariety {
    #[serde(rename = "NORMAL")]
    Normal,
    /// After-market order
    #[serde(rename = "AMO")]
    Amo,
    /// Bracket order with take-profit / stop-loss legs
    #[serde(rename = "BO")]
    Bracket,
    /// Cover order with a mandatory stop-loss trigger
    #[serde(rename = "CO")]
    Cover,
}

impl OrderVariety {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Amo => "AMO",
            Self::Bracket => "BO",
            Self::Cover => "CO",
        }
    }
}

/// Wire-level order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VenueOrderType {
    #[serde(rename = "MARKET")]
    Market,
    #[serde(rename = "LIMIT")]
    Limit,
    #[serde(rename = "STOPLOSS_LIMIT")]
    StopLossLimit,
    #[serde(rename = "STOPLOSS_MARKET")]
    StopLossMarket,
}

impl VenueOrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::StopLossLimit => "STOPLOSS_LIMIT",
            Self::StopLossMarket => "STOPLOSS_MARKET",
        }
    }
}

/// Product type (margining treatment at the venue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "INTRADAY")]
    Intraday,
    #[serde(rename = "DELIVERY")]
    Delivery,
    #[serde(rename = "CARRYFORWARD")]
    CarryForward,
    #[serde(rename = "MARGIN")]
    Margin,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intraday => "INTRADAY",
            Self::Delivery => "DELIVERY",
            Self::CarryForward => "CARRYFORWARD",
            Self::Margin => "MARGIN",
        }
    }
}

/// Order validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    #[serde(rename = "DAY")]
    Day,
    #[serde(rename = "IOC")]
    Ioc,
}

impl Validity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Ioc => "IOC",
        }
    }
}

/// Order submission payload in the venue's own field layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueOrderRequest {
    /// Client-assigned order reference for correlation
    #[serde(rename = "clientorderid")]
    pub client_order_id: String,
    pub variety: OrderVariety,
    #[serde(rename = "tradingsymbol")]
    pub trading_symbol: String,
    #[serde(rename = "symboltoken")]
    pub symbol_token: String,
    #[serde(rename = "transactiontype")]
    pub transaction_type: TransactionType,
    pub exchange: ExchangeSegment,
    #[serde(rename = "ordertype")]
    pub order_type: VenueOrderType,
    #[serde(rename = "producttype")]
    pub product_type: ProductType,
    pub duration: Validity,
    pub quantity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(rename = "triggerprice", skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squareoff: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stoploss: Option<Decimal>,
    #[serde(rename = "trailingStoploss", skip_serializing_if = "Option::is_none")]
    pub trailing_stoploss: Option<Decimal>,
}

/// Venue acknowledgment of a placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderAck {
    /// Broker-assigned order identifier
    #[serde(rename = "orderid")]
    pub order_id: String,
}

/// Order status codes pushed by the venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueOrderStatus {
    /// Accepted onto the venue's book
    Open,
    #[serde(rename = "partially filled")]
    PartiallyFilled,
    Complete,
    Rejected,
    Cancelled,
}

impl VenueOrderStatus {
    /// Check if the status is terminal (no more updates expected)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VenueOrderStatus::Complete | VenueOrderStatus::Rejected | VenueOrderStatus::Cancelled
        )
    }

    /// Check if the status carries a fill
    pub fn is_fill(&self) -> bool {
        matches!(
            self,
            VenueOrderStatus::PartiallyFilled | VenueOrderStatus::Complete
        )
    }
}

/// Order update pushed by the venue's order feed
///
/// Fill events carry the incremental quantity of that fill and its price;
/// cumulative bookkeeping is local.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdateEvent {
    /// Broker-assigned order identifier
    pub order_id: String,
    pub status: VenueOrderStatus,
    /// Quantity filled by this event (fills only)
    pub fill_quantity: Option<Decimal>,
    /// Price of this fill (fills only)
    pub fill_price: Option<Decimal>,
    /// Rejection reason (rejections only)
    pub reject_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl OrderUpdateEvent {
    /// Venue accepted the order onto its book
    pub fn open(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: VenueOrderStatus::Open,
            fill_quantity: None,
            fill_price: None,
            reject_reason: None,
            timestamp: Utc::now(),
        }
    }

    /// A fill; `complete` selects between partial and final
    pub fn fill(
        order_id: impl Into<String>,
        quantity: Decimal,
        price: Decimal,
        complete: bool,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            status: if complete {
                VenueOrderStatus::Complete
            } else {
                VenueOrderStatus::PartiallyFilled
            },
            fill_quantity: Some(quantity),
            fill_price: Some(price),
            reject_reason: None,
            timestamp: Utc::now(),
        }
    }

    /// Venue rejected the order
    pub fn rejected(order_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: VenueOrderStatus::Rejected,
            fill_quantity: None,
            fill_price: None,
            reject_reason: Some(reason.into()),
            timestamp: Utc::now(),
        }
    }

    /// Venue cancelled the order
    pub fn cancelled(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: VenueOrderStatus::Cancelled,
            fill_quantity: None,
            fill_price: None,
            reject_reason: None,
            timestamp: Utc::now(),
        }
    }
}
