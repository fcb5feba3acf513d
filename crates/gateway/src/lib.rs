//! Garuda Gateway
//!
//! Venue boundary for the Garuda broker bridge. Provides:
//! - Wire message types for the venue's order dialect and tick stream
//! - The `BrokerGateway` trait (the single seam to the outside venue)
//! - Transport abstraction (tokio channels) for the two push streams
//! - The paper adapter (in-process simulated venue)
//!
//! ## Architecture
//!
//! ```text
//! External venue (SmartAPI-style REST + websockets, or paper)
//!         │
//!    ┌────▼──────────┐
//!    │ BrokerGateway │  place_order / cancel_order / positions / cash
//!    └────┬──────────┘
//!         │ Push streams (channels):
//!         │ order updates, ticks
//!    ┌────▼────┐
//!    │ OMS /   │
//!    │ bars    │
//!    └─────────┘
//! ```

pub mod adapters;
pub mod broker;
pub mod error;
pub mod messages;
pub mod transport;

// Re-export commonly used types
pub use adapters::paper::PaperGateway;
pub use broker::{BrokerGateway, BrokerPosition};
pub use error::{GatewayError, TransportError};
pub use messages::{
    market_data::TickMessage,
    order::{
        OrderUpdateEvent, OrderVariety, PlaceOrderAck, ProductType, TransactionType, Validity,
        VenueOrderRequest, VenueOrderStatus, VenueOrderType,
    },
};
pub use transport::{
    Publisher, Subscriber,
    channel::{ChannelPublisher, ChannelSubscriber},
};
