//! Order lifecycle simulation
//!
//! Consumes an [`OrderRequest`], consults the latency model for the ack and
//! fill arrival times and the top-of-book store for the fill outcome, and
//! produces the acknowledgement plus the optional fill ack to be scheduled.
//!
//! Matching uses the book state at the time the lifecycle runs, which is the
//! current simulation time rather than the order's exchange-arrival time.
//! That introduces a lookahead opposite to the one live trading has; a
//! corrected variant would schedule the match itself as a future event at
//! the exchange-arrival time.

use std::sync::Arc;

use tracing::{debug, info};

use crate::core::{
    is_valid_price, Event, OrderAckEvent, OrderId, OrderRequest, OrderStatus, OrderType,
    INVALID_PRICE,
};
use crate::latency::LatencyModel;
use crate::metrics::{MetricsSink, SimulatedTrade};
use crate::orderbook::TopOfBook;

/// Simulates the exchange-side life of submitted orders
pub struct OrderLifecycle {
    latency: LatencyModel,
    metrics: Arc<dyn MetricsSink>,
    next_exchange_order_id: OrderId,
}

impl OrderLifecycle {
    pub fn new(latency: LatencyModel, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            latency,
            metrics,
            next_exchange_order_id: 1,
        }
    }

    fn next_exchange_order_id(&mut self) -> OrderId {
        let id = self.next_exchange_order_id;
        self.next_exchange_order_id += 1;
        id
    }

    /// Run one request through the simulated exchange. Returns the events to
    /// schedule: always the acknowledgement, plus a fill ack when liquidity
    /// was available.
    pub fn process(&mut self, request: OrderRequest, book: &mut TopOfBook) -> Vec<Event> {
        info!(
            strategy = %request.strategy_id,
            client_order_id = request.client_order_id,
            symbol = %request.symbol,
            side = %request.side,
            order_type = %request.order_type,
            quantity = request.quantity,
            "simulating order lifecycle"
        );

        let exchange_order_id = self.next_exchange_order_id();
        let t_exch = self.latency.order_arrival_at_exchange(request.ts_decision);
        let t_ack = self.latency.ack_arrival_at_strategy(t_exch);

        let mut events = Vec::with_capacity(2);
        events.push(Event::OrderAck(OrderAckEvent {
            ts_arrival: t_ack,
            strategy_id: request.strategy_id.clone(),
            client_order_id: request.client_order_id,
            exchange_order_id,
            symbol: request.symbol.clone(),
            status: OrderStatus::Acknowledged,
            last_fill_px: INVALID_PRICE,
            last_fill_qty: 0,
            cum_qty: 0,
            leaves_qty: request.quantity,
        }));

        let (fill_px, fill_qty) = match request.order_type {
            OrderType::Market => book.match_market(request.side, request.quantity),
            OrderType::Limit => book.match_limit(request.side, request.price, request.quantity),
        };

        if fill_qty > 0 && is_valid_price(fill_px) {
            // A fill can never reach the strategy before its acknowledgement.
            let t_fill = self
                .latency
                .fill_arrival_at_strategy(t_exch)
                .max(t_ack.saturating_add_ns(1));

            let status = if fill_qty == request.quantity {
                OrderStatus::Filled
            } else {
                OrderStatus::PartiallyFilled
            };
            events.push(Event::OrderAck(OrderAckEvent {
                ts_arrival: t_fill,
                strategy_id: request.strategy_id.clone(),
                client_order_id: request.client_order_id,
                exchange_order_id,
                symbol: request.symbol.clone(),
                status,
                last_fill_px: fill_px,
                last_fill_qty: fill_qty,
                cum_qty: fill_qty,
                leaves_qty: request.quantity - fill_qty,
            }));

            self.metrics.record_trade(&SimulatedTrade {
                ts: t_fill,
                strategy_id: request.strategy_id.clone(),
                symbol: request.symbol.clone(),
                side: request.side,
                price: fill_px,
                quantity: fill_qty,
                client_order_id: request.client_order_id,
                exchange_order_id,
            });
            self.metrics.record_latency(
                &format!("{}_decision_to_fill_ack", request.strategy_id),
                t_fill.duration_since(request.ts_decision),
                t_fill,
            );
        } else if request.order_type == OrderType::Limit {
            // Passive: acknowledged only. This model does not rest limit
            // orders for matching against later ticks.
            debug!(
                client_order_id = request.client_order_id,
                symbol = %request.symbol,
                "limit order is passive, no immediate fill"
            );
        } else {
            debug!(
                client_order_id = request.client_order_id,
                symbol = %request.symbol,
                quantity = request.quantity,
                "market order found no liquidity, acknowledged without fill"
            );
        }

        events
    }
}
