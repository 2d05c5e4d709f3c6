//! Core simulation types
//!
//! Timestamps, prices, order primitives and the event model shared by every
//! other module. Everything here is plain owned data: events move from the
//! parser into the scheduler, out of the scheduler into a handler, and are
//! duplicated per strategy mailbox on broadcast.

pub mod events;
pub mod types;

pub use events::{
    DispatcherControlEvent, DispatcherControlKind, Event, MarketEvent, OrderAckEvent,
    OrderRequest, QuoteEvent, StrategyControlEvent, StrategyControlKind, StrategyMessage,
    TradeEvent,
};
pub use types::{
    is_valid_price, parse_duration_ns, DurationNs, OrderId, OrderStatus, OrderType, Price,
    Quantity, Side, StrategyId, Timestamp, INVALID_PRICE, PRICE_EPSILON,
};
