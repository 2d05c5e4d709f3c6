//! Mean reversion over a rolling mid-price window
//!
//! Keeps the last `window` mid prices for its symbol. Once the window is
//! full, a mid more than `threshold_bps` above the rolling average sends a
//! market sell, and one equally far below sends a market buy. After firing,
//! the strategy sits out `cooldown_quotes` quotes so it does not pyramid
//! into one stretched move while earlier orders are still in flight.

use std::collections::VecDeque;

use tracing::{debug, info};

use tape_core::core::{OrderAckEvent, QuoteEvent};
use tape_core::prelude::*;

/// Tunables for [`MeanReversion`]
#[derive(Debug, Clone)]
pub struct MeanReversionParams {
    /// Number of mids in the rolling average
    pub window: usize,
    /// Deviation from the average that triggers an order, in basis points
    pub threshold_bps: f64,
    /// Quantity of each market order
    pub order_quantity: Quantity,
    /// Quotes to skip after firing before re-arming
    pub cooldown_quotes: u32,
}

impl Default for MeanReversionParams {
    fn default() -> Self {
        Self {
            window: 20,
            threshold_bps: 5.0,
            order_quantity: 1_000,
            cooldown_quotes: 10,
        }
    }
}

/// Fades deviations of the mid from its rolling average
pub struct MeanReversion {
    symbol: String,
    params: MeanReversionParams,
    mids: VecDeque<f64>,
    mid_sum: f64,
    cooldown: u32,
    orders_sent: u64,
}

impl MeanReversion {
    pub fn new(symbol: impl Into<String>, params: MeanReversionParams) -> Self {
        Self {
            symbol: symbol.into(),
            mids: VecDeque::with_capacity(params.window),
            mid_sum: 0.0,
            cooldown: 0,
            orders_sent: 0,
            params,
        }
    }

    pub fn orders_sent(&self) -> u64 {
        self.orders_sent
    }

    /// Push a mid into the window, evicting the oldest when full
    fn observe_mid(&mut self, mid: f64) {
        if self.mids.len() == self.params.window {
            if let Some(oldest) = self.mids.pop_front() {
                self.mid_sum -= oldest;
            }
        }
        self.mids.push_back(mid);
        self.mid_sum += mid;
    }

    /// Side to fire, if the deviation from the rolling average exceeds the
    /// threshold. Requires a full window.
    fn signal(&self, mid: f64) -> Option<Side> {
        if self.mids.len() < self.params.window {
            return None;
        }
        let average = self.mid_sum / self.mids.len() as f64;
        let deviation_bps = (mid - average) / average * 10_000.0;

        if deviation_bps >= self.params.threshold_bps {
            Some(Side::Sell)
        } else if deviation_bps <= -self.params.threshold_bps {
            Some(Side::Buy)
        } else {
            None
        }
    }
}

impl Strategy for MeanReversion {
    fn on_init(&mut self, ctx: &mut StrategyContext, ts: Timestamp) {
        info!(
            strategy = ctx.strategy_id(),
            symbol = %self.symbol,
            window = self.params.window,
            threshold_bps = self.params.threshold_bps,
            sim_time = %ts,
            "initialized"
        );
    }

    fn on_quote(&mut self, ctx: &mut StrategyContext, quote: &QuoteEvent, ts_arrival: Timestamp) {
        if quote.symbol != self.symbol {
            return;
        }
        // Both sides must be live for a usable mid.
        if !(quote.bid_px > 0.0 && quote.bid_sz > 0 && quote.ask_px > 0.0 && quote.ask_sz > 0) {
            return;
        }

        let mid = (quote.bid_px + quote.ask_px) / 2.0;
        let signal = self.signal(mid);
        self.observe_mid(mid);

        if self.cooldown > 0 {
            self.cooldown -= 1;
            return;
        }

        if let Some(side) = signal {
            info!(
                strategy = ctx.strategy_id(),
                %side,
                mid,
                "mid stretched away from rolling average, fading the move"
            );
            ctx.submit_market(&self.symbol, side, self.params.order_quantity, ts_arrival);
            self.orders_sent += 1;
            self.cooldown = self.params.cooldown_quotes;
        }
    }

    fn on_order_ack(
        &mut self,
        ctx: &mut StrategyContext,
        ack: &OrderAckEvent,
        _ts_arrival: Timestamp,
    ) {
        if ack.is_fill() {
            debug!(
                strategy = ctx.strategy_id(),
                client_order_id = ack.client_order_id,
                px = ack.last_fill_px,
                qty = ack.last_fill_qty,
                "fill"
            );
        }
    }

    fn on_shutdown(&mut self, ctx: &mut StrategyContext, ts: Timestamp) {
        info!(
            strategy = ctx.strategy_id(),
            orders_sent = self.orders_sent,
            sim_time = %ts,
            "shutting down"
        );
    }

    fn name(&self) -> &'static str {
        "MeanReversion"
    }
}
