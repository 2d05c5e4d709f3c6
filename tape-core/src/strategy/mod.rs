//! Strategy contract
//!
//! A strategy implements [`Strategy`] and runs on its own worker thread. The
//! dispatcher pushes events into the strategy's mailbox; the worker pops them
//! and invokes the matching callback with the event's effective arrival
//! timestamp. That timestamp is the strategy's view of "now", and the value
//! it must pass as the decision time when submitting orders in response.
//!
//! Order submission goes through the [`StrategyContext`] handed to every
//! callback, which enqueues onto the dispatcher's order-request queue. It
//! must only be used from the strategy's own worker thread.

use std::sync::Arc;

use tracing::debug;

use crate::core::{
    OrderAckEvent, OrderId, OrderRequest, OrderType, Price, Quantity, QuoteEvent, Side,
    StrategyControlEvent, StrategyId, Timestamp, TradeEvent, INVALID_PRICE,
};
use crate::metrics::MetricsSink;
use crate::queue::BlockingQueue;

/// The capability each registered strategy implements.
///
/// Default bodies are no-ops so a strategy only writes the callbacks it
/// cares about. Callbacks run on the strategy's worker thread; a panic is
/// caught and logged by the worker and does not stop the simulation.
pub trait Strategy: Send {
    /// Called once before any event, with the earliest scheduled simulation
    /// time (or the sentinel minimum when the feed is empty).
    fn on_init(&mut self, _ctx: &mut StrategyContext, _ts: Timestamp) {}

    fn on_quote(&mut self, _ctx: &mut StrategyContext, _quote: &QuoteEvent, _ts_arrival: Timestamp) {
    }

    fn on_trade(&mut self, _ctx: &mut StrategyContext, _trade: &TradeEvent, _ts_arrival: Timestamp) {
    }

    fn on_order_ack(
        &mut self,
        _ctx: &mut StrategyContext,
        _ack: &OrderAckEvent,
        _ts_arrival: Timestamp,
    ) {
    }

    fn on_sim_control(
        &mut self,
        _ctx: &mut StrategyContext,
        _ctrl: &StrategyControlEvent,
        _ts_arrival: Timestamp,
    ) {
    }

    /// Called exactly once, after the shutdown control has been dequeued and
    /// any remaining mailbox deliveries (late acks included) have been
    /// dispatched, with the simulation time of the shutdown.
    fn on_shutdown(&mut self, _ctx: &mut StrategyContext, _ts: Timestamp) {}

    /// Name for logging
    fn name(&self) -> &'static str;
}

/// Per-strategy state handed into every callback: identity, the client order
/// id counter, the order submission handle and the metrics sink.
pub struct StrategyContext {
    strategy_id: StrategyId,
    next_client_order_id: OrderId,
    order_queue: Arc<BlockingQueue<OrderRequest>>,
    metrics: Arc<dyn MetricsSink>,
}

impl StrategyContext {
    pub fn new(
        strategy_id: impl Into<StrategyId>,
        order_queue: Arc<BlockingQueue<OrderRequest>>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            next_client_order_id: 1,
            order_queue,
            metrics,
        }
    }

    pub fn strategy_id(&self) -> &str {
        &self.strategy_id
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.metrics
    }

    /// Submit a market order. `ts_decision` must be the arrival timestamp of
    /// the event that caused the decision. Returns the client order id.
    pub fn submit_market(
        &mut self,
        symbol: impl Into<String>,
        side: Side,
        quantity: Quantity,
        ts_decision: Timestamp,
    ) -> OrderId {
        self.submit(
            symbol.into(),
            side,
            OrderType::Market,
            INVALID_PRICE,
            quantity,
            ts_decision,
        )
    }

    /// Submit a limit order. Same decision-time contract as
    /// [`Self::submit_market`].
    pub fn submit_limit(
        &mut self,
        symbol: impl Into<String>,
        side: Side,
        price: Price,
        quantity: Quantity,
        ts_decision: Timestamp,
    ) -> OrderId {
        self.submit(
            symbol.into(),
            side,
            OrderType::Limit,
            price,
            quantity,
            ts_decision,
        )
    }

    fn submit(
        &mut self,
        symbol: String,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
        ts_decision: Timestamp,
    ) -> OrderId {
        let client_order_id = self.next_client_order_id;
        self.next_client_order_id += 1;

        debug!(
            strategy = %self.strategy_id,
            client_order_id,
            %symbol,
            %side,
            %order_type,
            price,
            quantity,
            ts_decision = %ts_decision,
            "submitting order"
        );

        self.order_queue.push(OrderRequest {
            strategy_id: self.strategy_id.clone(),
            client_order_id,
            symbol,
            side,
            order_type,
            price,
            quantity,
            ts_decision,
        });

        // Submission marker; the sink can correlate it with the fill-ack
        // latency sample recorded by the lifecycle simulator.
        self.metrics.record_latency(
            &format!("{}_order_submitted", self.strategy_id),
            0,
            ts_decision,
        );

        client_order_id
    }
}
