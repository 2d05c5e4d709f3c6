//! Tape Core - Deterministic Market-Replay Simulation Engine
//!
//! A discrete-event simulator that replays a historical stream of quotes and
//! trades into user-supplied trading strategies, subject to a configurable
//! latency model, and simulates the lifecycle of the orders they submit in
//! response. The output is a fully time-ordered trace of market data, order
//! acknowledgements and fills.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   md_arrival    ┌──────────────────────────────────────┐
//! │ TickReader │ ──────────────▶ │ Dispatcher (one thread)              │
//! │ (CSV feed) │                 │                                      │
//! └────────────┘                 │  ┌────────────┐   ┌──────────────┐   │
//!                                │  │ EventQueue │──▶│ current time │   │
//!        order requests          │  └────────────┘   └──────────────┘   │
//!   ┌──────────────────────────▶ │        │                             │
//!   │                            │        ▼                             │
//!   │                            │  ┌────────────┐   ┌──────────────┐   │
//!   │                            │  │  BookStore │◀──│OrderLifecycle│   │
//!   │                            │  └────────────┘   └──────────────┘   │
//!   │                            └──────────┬───────────────▲───────────┘
//!   │                                       │ broadcast /   │ acks, fills
//!   │                                       ▼ route         │ (back into
//!   │                            ┌──────────────────────┐   │  EventQueue)
//!   │   ┌────────────────┐       │ mailbox per strategy │   │
//!   └── │ StrategyWorker │ ◀──── │ (bounded, blocking)  │ ──┘
//!       │ (one thread    │       └──────────────────────┘
//!       │  per strategy) │
//!       └────────────────┘
//! ```
//!
//! Every event carries an effective arrival timestamp; the scheduler pops in
//! that order and the popped timestamp *is* the simulated clock. Strategy
//! worker threads communicate with the dispatch thread exclusively through
//! the queues; no other state is shared.
//!
//! ## Determinism
//!
//! Given the same tick file, latency configuration and strategies, a run
//! produces the same ordered trace: the latency model is a pure function,
//! timestamp ties in the scheduler break by insertion order, and each
//! strategy sees a consistent local order of its own events. Only the
//! interleaving *between* strategies at identical timestamps is unspecified.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tape_core::data::TickReader;
//! use tape_core::engine::Dispatcher;
//! use tape_core::latency::{LatencyConfig, LatencyModel};
//! use tape_core::metrics::NullSink;
//! # use tape_core::strategy::{Strategy, StrategyContext};
//! # struct Noop;
//! # impl Strategy for Noop { fn name(&self) -> &'static str { "Noop" } }
//!
//! let latency = LatencyModel::new(LatencyConfig::default());
//! let mut dispatcher = Dispatcher::new(latency, Arc::new(NullSink));
//! dispatcher.add_strategy("noop_1", Box::new(Noop))?;
//!
//! let feed = TickReader::open("ticks.csv")?;
//! let stats = dispatcher.run(feed)?;
//! println!("dispatched {} events", stats.events_dispatched);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod data;
pub mod engine;
pub mod latency;
pub mod metrics;
pub mod orderbook;
pub mod queue;
pub mod strategy;

pub use crate::core::{
    Event, MarketEvent, OrderAckEvent, OrderId, OrderRequest, OrderStatus, OrderType, Price,
    Quantity, QuoteEvent, Side, StrategyId, Timestamp, TradeEvent,
};
pub use engine::{Dispatcher, RunStats};
pub use latency::{LatencyConfig, LatencyModel};
pub use strategy::{Strategy, StrategyContext};

// Re-export error types
pub use anyhow::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::core::{
        is_valid_price, Event, MarketEvent, OrderAckEvent, OrderId, OrderRequest, OrderStatus,
        OrderType, Price, Quantity, QuoteEvent, Side, StrategyControlEvent, StrategyControlKind,
        StrategyId, Timestamp, TradeEvent, INVALID_PRICE,
    };
    pub use crate::data::TickReader;
    pub use crate::engine::{Dispatcher, RunStats};
    pub use crate::latency::{LatencyConfig, LatencyModel};
    pub use crate::metrics::{MetricsCollector, MetricsSink, NullSink, SimulatedTrade};
    pub use crate::strategy::{Strategy, StrategyContext};
    pub use crate::{Error, Result};
}
