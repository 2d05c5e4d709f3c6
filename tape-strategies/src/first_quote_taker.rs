//! One-shot market taker
//!
//! Submits a single market order on the first quote for its symbol that
//! shows liquidity on the side it would hit, then only watches its acks.

use tracing::{info, warn};

use tape_core::core::{OrderAckEvent, OrderStatus, QuoteEvent};
use tape_core::prelude::*;

/// Fires one market order at the first usable quote
pub struct FirstQuoteTaker {
    symbol: String,
    side: Side,
    quantity: Quantity,
    sent: bool,
}

impl FirstQuoteTaker {
    pub fn new(symbol: impl Into<String>, side: Side, quantity: Quantity) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            sent: false,
        }
    }

    /// Whether the order would find a resting level to hit
    fn has_opposite_liquidity(&self, quote: &QuoteEvent) -> bool {
        match self.side {
            Side::Buy => quote.ask_px > 0.0 && quote.ask_sz > 0,
            Side::Sell => quote.bid_px > 0.0 && quote.bid_sz > 0,
        }
    }
}

impl Strategy for FirstQuoteTaker {
    fn on_init(&mut self, ctx: &mut StrategyContext, ts: Timestamp) {
        info!(strategy = ctx.strategy_id(), sim_time = %ts, "initialized");
    }

    fn on_quote(&mut self, ctx: &mut StrategyContext, quote: &QuoteEvent, ts_arrival: Timestamp) {
        if self.sent || quote.symbol != self.symbol || !self.has_opposite_liquidity(quote) {
            return;
        }

        info!(
            strategy = ctx.strategy_id(),
            symbol = %self.symbol,
            side = %self.side,
            quantity = self.quantity,
            "first usable quote, submitting market order"
        );
        ctx.submit_market(&self.symbol, self.side, self.quantity, ts_arrival);
        self.sent = true;
    }

    fn on_order_ack(
        &mut self,
        ctx: &mut StrategyContext,
        ack: &OrderAckEvent,
        _ts_arrival: Timestamp,
    ) {
        match ack.status {
            OrderStatus::Filled | OrderStatus::PartiallyFilled => info!(
                strategy = ctx.strategy_id(),
                client_order_id = ack.client_order_id,
                px = ack.last_fill_px,
                qty = ack.last_fill_qty,
                leaves = ack.leaves_qty,
                "fill received"
            ),
            OrderStatus::Rejected => warn!(
                strategy = ctx.strategy_id(),
                client_order_id = ack.client_order_id,
                "order rejected"
            ),
            _ => {}
        }
    }

    fn on_shutdown(&mut self, ctx: &mut StrategyContext, ts: Timestamp) {
        info!(strategy = ctx.strategy_id(), sim_time = %ts, "shutting down");
    }

    fn name(&self) -> &'static str {
        "FirstQuoteTaker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tape_core::core::OrderRequest;
    use tape_core::metrics::NullSink;
    use tape_core::queue::{BlockingQueue, TryPop};

    fn quote(symbol: &str, bid_sz: u64, ask_sz: u64) -> QuoteEvent {
        QuoteEvent {
            ts_exchange: Timestamp::from_nanos(1_000_000_000),
            ts_arrival: Timestamp::from_nanos(1_000_050_000),
            symbol: symbol.to_string(),
            bid_px: if bid_sz > 0 { 1.07100 } else { INVALID_PRICE },
            bid_sz,
            ask_px: if ask_sz > 0 { 1.07105 } else { INVALID_PRICE },
            ask_sz,
        }
    }

    fn harness() -> (Arc<BlockingQueue<OrderRequest>>, StrategyContext) {
        let queue = Arc::new(BlockingQueue::unbounded());
        let ctx = StrategyContext::new("taker_1", Arc::clone(&queue), Arc::new(NullSink));
        (queue, ctx)
    }

    #[test]
    fn test_submits_once_on_first_matching_quote() {
        let (queue, mut ctx) = harness();
        let mut strategy = FirstQuoteTaker::new("EURUSD", Side::Buy, 1_000);

        let q = quote("EURUSD", 100_000, 100_000);
        strategy.on_quote(&mut ctx, &q, q.ts_arrival);
        strategy.on_quote(&mut ctx, &q, q.ts_arrival);

        let TryPop::Item(req) = queue.try_pop() else {
            panic!("expected one submitted order");
        };
        assert_eq!(req.symbol, "EURUSD");
        assert_eq!(req.side, Side::Buy);
        assert_eq!(req.order_type, OrderType::Market);
        assert_eq!(req.quantity, 1_000);
        assert_eq!(req.ts_decision, Timestamp::from_nanos(1_000_050_000));
        assert_eq!(queue.try_pop(), TryPop::Empty);
    }

    #[test]
    fn test_ignores_other_symbols() {
        let (queue, mut ctx) = harness();
        let mut strategy = FirstQuoteTaker::new("EURUSD", Side::Buy, 1_000);

        let q = quote("GBPUSD", 100_000, 100_000);
        strategy.on_quote(&mut ctx, &q, q.ts_arrival);
        assert_eq!(queue.try_pop(), TryPop::Empty);
    }

    #[test]
    fn test_waits_for_opposite_liquidity() {
        let (queue, mut ctx) = harness();
        let mut strategy = FirstQuoteTaker::new("EURUSD", Side::Buy, 1_000);

        // No ask side yet: a buy has nothing to hit.
        let empty_ask = quote("EURUSD", 100_000, 0);
        strategy.on_quote(&mut ctx, &empty_ask, empty_ask.ts_arrival);
        assert_eq!(queue.try_pop(), TryPop::Empty);

        let usable = quote("EURUSD", 100_000, 50_000);
        strategy.on_quote(&mut ctx, &usable, usable.ts_arrival);
        assert!(matches!(queue.try_pop(), TryPop::Item(_)));
    }

    #[test]
    fn test_sell_side_checks_bid() {
        let (queue, mut ctx) = harness();
        let mut strategy = FirstQuoteTaker::new("EURUSD", Side::Sell, 500);

        let no_bid = quote("EURUSD", 0, 100_000);
        strategy.on_quote(&mut ctx, &no_bid, no_bid.ts_arrival);
        assert_eq!(queue.try_pop(), TryPop::Empty);

        let with_bid = quote("EURUSD", 10_000, 100_000);
        strategy.on_quote(&mut ctx, &with_bid, with_bid.ts_arrival);
        let TryPop::Item(req) = queue.try_pop() else {
            panic!("expected a sell order");
        };
        assert_eq!(req.side, Side::Sell);
    }
}
