//! Shared scaffolding for the simulation integration tests
#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use tape_core::core::{
    OrderAckEvent, QuoteEvent, StrategyControlEvent, StrategyControlKind, TradeEvent,
    INVALID_PRICE,
};
use tape_core::prelude::*;

/// Everything a probe strategy observed, in callback order
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Init(Timestamp),
    Quote {
        symbol: String,
        ts: Timestamp,
        bid_px: Price,
        ask_px: Price,
    },
    Trade {
        symbol: String,
        ts: Timestamp,
    },
    Ack(OrderAckEvent),
    Control {
        kind: StrategyControlKind,
        ts: Timestamp,
    },
    Shutdown(Timestamp),
}

/// One order to fire from `on_quote`
#[derive(Debug, Clone)]
pub struct PlannedOrder {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    /// Fire on the n-th observed quote (1-based)
    pub on_quote_number: u64,
}

impl PlannedOrder {
    pub fn market(symbol: &str, side: Side, quantity: Quantity) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Market,
            price: INVALID_PRICE,
            quantity,
            on_quote_number: 1,
        }
    }

    pub fn limit(symbol: &str, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Limit,
            price,
            quantity,
            on_quote_number: 1,
        }
    }

    pub fn on_quote(mut self, n: u64) -> Self {
        self.on_quote_number = n;
        self
    }
}

/// Journal handle shared between a test and its probe strategy
pub type Journal = Arc<Mutex<Vec<Observed>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// Records every callback and submits its planned orders from `on_quote`,
/// using the quote's arrival time as the decision time.
pub struct Probe {
    journal: Journal,
    plan: Vec<PlannedOrder>,
    quotes_seen: u64,
    decision_delay: Option<std::time::Duration>,
}

impl Probe {
    pub fn passive(journal: Journal) -> Self {
        Self::with_plan(journal, Vec::new())
    }

    pub fn with_plan(journal: Journal, plan: Vec<PlannedOrder>) -> Self {
        Self {
            journal,
            plan,
            quotes_seen: 0,
            decision_delay: None,
        }
    }

    /// Simulate a slow callback: wall-clock pause inside `on_quote` before
    /// any order is submitted.
    pub fn with_decision_delay(mut self, delay: std::time::Duration) -> Self {
        self.decision_delay = Some(delay);
        self
    }
}

impl Strategy for Probe {
    fn on_init(&mut self, _ctx: &mut StrategyContext, ts: Timestamp) {
        self.journal.lock().push(Observed::Init(ts));
    }

    fn on_quote(&mut self, ctx: &mut StrategyContext, quote: &QuoteEvent, ts_arrival: Timestamp) {
        self.quotes_seen += 1;
        self.journal.lock().push(Observed::Quote {
            symbol: quote.symbol.clone(),
            ts: ts_arrival,
            bid_px: quote.bid_px,
            ask_px: quote.ask_px,
        });

        if let Some(delay) = self.decision_delay {
            std::thread::sleep(delay);
        }

        for order in &self.plan {
            if order.on_quote_number == self.quotes_seen && order.symbol == quote.symbol {
                match order.order_type {
                    OrderType::Market => {
                        ctx.submit_market(&order.symbol, order.side, order.quantity, ts_arrival);
                    }
                    OrderType::Limit => {
                        ctx.submit_limit(
                            &order.symbol,
                            order.side,
                            order.price,
                            order.quantity,
                            ts_arrival,
                        );
                    }
                }
            }
        }
    }

    fn on_trade(&mut self, _ctx: &mut StrategyContext, trade: &TradeEvent, ts_arrival: Timestamp) {
        self.journal.lock().push(Observed::Trade {
            symbol: trade.symbol.clone(),
            ts: ts_arrival,
        });
    }

    fn on_order_ack(
        &mut self,
        _ctx: &mut StrategyContext,
        ack: &OrderAckEvent,
        _ts_arrival: Timestamp,
    ) {
        self.journal.lock().push(Observed::Ack(ack.clone()));
    }

    fn on_sim_control(
        &mut self,
        _ctx: &mut StrategyContext,
        ctrl: &StrategyControlEvent,
        ts_arrival: Timestamp,
    ) {
        self.journal.lock().push(Observed::Control {
            kind: ctrl.kind,
            ts: ts_arrival,
        });
    }

    fn on_shutdown(&mut self, _ctx: &mut StrategyContext, ts: Timestamp) {
        self.journal.lock().push(Observed::Shutdown(ts));
    }

    fn name(&self) -> &'static str {
        "Probe"
    }
}

/// A quote stamped with exchange time only, as the parser would yield it
pub fn quote(ts_exchange_ns: i64, symbol: &str, bid_px: f64, bid_sz: u64, ask_px: f64, ask_sz: u64) -> MarketEvent {
    MarketEvent::Quote(QuoteEvent {
        ts_exchange: Timestamp::from_nanos(ts_exchange_ns),
        ts_arrival: Timestamp::from_nanos(ts_exchange_ns),
        symbol: symbol.to_string(),
        bid_px,
        bid_sz,
        ask_px,
        ask_sz,
    })
}

pub fn trade(ts_exchange_ns: i64, symbol: &str, price: f64, size: u64) -> MarketEvent {
    MarketEvent::Trade(TradeEvent {
        ts_exchange: Timestamp::from_nanos(ts_exchange_ns),
        ts_arrival: Timestamp::from_nanos(ts_exchange_ns),
        symbol: symbol.to_string(),
        price,
        size,
    })
}

/// Acks in journal order
pub fn acks(journal: &Journal) -> Vec<OrderAckEvent> {
    journal
        .lock()
        .iter()
        .filter_map(|o| match o {
            Observed::Ack(a) => Some(a.clone()),
            _ => None,
        })
        .collect()
}

/// Quote observations in journal order
pub fn quotes(journal: &Journal) -> Vec<(String, Timestamp)> {
    journal
        .lock()
        .iter()
        .filter_map(|o| match o {
            Observed::Quote { symbol, ts, .. } => Some((symbol.clone(), *ts)),
            _ => None,
        })
        .collect()
}
