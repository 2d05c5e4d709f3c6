//! Event model
//!
//! A tagged sum with exhaustive matching on the dispatch side replaces the
//! inheritance-and-virtual-dispatch shape such simulators often grow: the
//! scheduler orders [`Event`]s by effective timestamp, and strategy mailboxes
//! carry [`StrategyMessage`]s, which are fresh copies made at broadcast time
//! so no event is ever shared between queues.

use serde::{Deserialize, Serialize};

use super::types::{OrderId, OrderStatus, OrderType, Price, Quantity, Side, StrategyId, Timestamp};

/// Best bid/ask update for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteEvent {
    /// When the quote occurred at the exchange
    pub ts_exchange: Timestamp,
    /// When the quote lands in a strategy mailbox (exchange time plus feed latency)
    pub ts_arrival: Timestamp,
    pub symbol: String,
    pub bid_px: Price,
    pub bid_sz: Quantity,
    pub ask_px: Price,
    pub ask_sz: Quantity,
}

/// Printed trade for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub ts_exchange: Timestamp,
    pub ts_arrival: Timestamp,
    pub symbol: String,
    pub price: Price,
    pub size: Quantity,
}

/// Exchange response to an order request: the initial acknowledgement, and
/// the optional fill that follows it.
///
/// Invariant: `cum_qty + leaves_qty` equals the requested quantity on every
/// ack emitted for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAckEvent {
    /// When the ack lands in the owning strategy's mailbox
    pub ts_arrival: Timestamp,
    pub strategy_id: StrategyId,
    pub client_order_id: OrderId,
    pub exchange_order_id: OrderId,
    pub symbol: String,
    pub status: OrderStatus,
    /// Fill price, or the invalid sentinel when nothing filled
    pub last_fill_px: Price,
    pub last_fill_qty: Quantity,
    pub cum_qty: Quantity,
    pub leaves_qty: Quantity,
}

impl OrderAckEvent {
    /// Whether this ack reports an execution
    pub fn is_fill(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Filled | OrderStatus::PartiallyFilled
        )
    }
}

/// Dispatcher-internal control actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherControlKind {
    /// Drain the order-request queue and re-arm the periodic check
    ProcessOrderRequests,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherControlEvent {
    pub ts_arrival: Timestamp,
    pub kind: DispatcherControlKind,
}

/// Control actions visible to strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyControlKind {
    /// The historical feed has been fully dispatched
    EndOfDataFeed,
    /// The receiving strategy should wind down
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyControlEvent {
    pub ts_arrival: Timestamp,
    pub kind: StrategyControlKind,
    /// Present when the control targets a single strategy
    pub target_strategy_id: Option<StrategyId>,
}

/// A scheduler event, ordered by its effective arrival time
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Quote(QuoteEvent),
    Trade(TradeEvent),
    OrderAck(OrderAckEvent),
    DispatcherControl(DispatcherControlEvent),
    StrategyControl(StrategyControlEvent),
}

impl Event {
    /// The simulated time at which this event becomes visible to its consumer.
    /// This is the scheduler's ordering key.
    pub fn effective_ts(&self) -> Timestamp {
        match self {
            Event::Quote(q) => q.ts_arrival,
            Event::Trade(t) => t.ts_arrival,
            Event::OrderAck(a) => a.ts_arrival,
            Event::DispatcherControl(c) => c.ts_arrival,
            Event::StrategyControl(c) => c.ts_arrival,
        }
    }
}

/// What the tick-file parser yields: market data stamped with exchange time
/// only. The dispatcher computes the arrival time via the latency model when
/// loading the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    Quote(QuoteEvent),
    Trade(TradeEvent),
}

impl MarketEvent {
    pub fn ts_exchange(&self) -> Timestamp {
        match self {
            MarketEvent::Quote(q) => q.ts_exchange,
            MarketEvent::Trade(t) => t.ts_exchange,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            MarketEvent::Quote(q) => &q.symbol,
            MarketEvent::Trade(t) => &t.symbol,
        }
    }
}

/// An item in a strategy mailbox. Each is a fresh copy owned by exactly one
/// mailbox; the worker consumes it and dispatches to the matching callback.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyMessage {
    Quote(QuoteEvent),
    Trade(TradeEvent),
    OrderAck(OrderAckEvent),
    Control(StrategyControlEvent),
}

impl StrategyMessage {
    /// Effective arrival time: the strategy's view of "now" while handling
    /// this message, and what it must pass as `ts_decision` when submitting
    /// orders in response.
    pub fn arrival_ts(&self) -> Timestamp {
        match self {
            StrategyMessage::Quote(q) => q.ts_arrival,
            StrategyMessage::Trade(t) => t.ts_arrival,
            StrategyMessage::OrderAck(a) => a.ts_arrival,
            StrategyMessage::Control(c) => c.ts_arrival,
        }
    }
}

/// Order submission carried from a strategy worker to the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub strategy_id: StrategyId,
    pub client_order_id: OrderId,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price; the invalid sentinel for market orders
    pub price: Price,
    pub quantity: Quantity,
    /// Arrival time of the event that caused the strategy to decide
    pub ts_decision: Timestamp,
}
