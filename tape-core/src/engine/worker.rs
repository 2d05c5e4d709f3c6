//! Strategy worker thread
//!
//! One per registered strategy. Owns the strategy object and its context,
//! consumes the mailbox, and dispatches each message to the matching
//! callback. A `Shutdown` control is delivered through `on_sim_control`;
//! the worker then keeps consuming until the dispatcher closes the mailbox
//! and the remaining items have drained, so acks routed after the shutdown
//! control (a slow callback may submit its last order while the end-of-feed
//! marker is being scheduled) still reach the strategy before `on_shutdown`.
//! Callbacks are fenced with `catch_unwind`: a panicking strategy is logged
//! and the worker keeps consuming, so one crashed strategy cannot stall the
//! simulation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::core::{StrategyControlKind, StrategyMessage, Timestamp};
use crate::queue::BlockingQueue;
use crate::strategy::{Strategy, StrategyContext};

/// Invoke one callback, absorbing panics
fn guarded(strategy_id: &str, callback_name: &str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        error!(
            strategy = strategy_id,
            callback = callback_name,
            "strategy callback panicked; continuing"
        );
    }
}

/// Spawn the worker thread for one strategy.
///
/// `processed` is incremented after each callback completes (on_init
/// included); the dispatcher compares it against its delivery count to
/// decide when this strategy can no longer produce orders.
pub fn spawn_worker(
    mut strategy: Box<dyn Strategy>,
    mut ctx: StrategyContext,
    mailbox: Arc<BlockingQueue<StrategyMessage>>,
    processed: Arc<AtomicU64>,
    initial_ts: Timestamp,
) -> Result<JoinHandle<()>> {
    let id = ctx.strategy_id().to_string();
    let id_for_err = id.clone();
    thread::Builder::new()
        .name(format!("strategy-{id}"))
        .spawn(move || {
            info!(strategy = %id, name = strategy.name(), "worker starting");

            guarded(&id, "on_init", || strategy.on_init(&mut ctx, initial_ts));
            processed.fetch_add(1, Ordering::Release);

            let mut last_ts = initial_ts;
            let mut shutdown_ts = None;
            while let Some(message) = mailbox.wait_pop() {
                last_ts = message.arrival_ts();
                match message {
                    StrategyMessage::Quote(quote) => {
                        let ts = quote.ts_arrival;
                        guarded(&id, "on_quote", || strategy.on_quote(&mut ctx, &quote, ts));
                    }
                    StrategyMessage::Trade(trade) => {
                        let ts = trade.ts_arrival;
                        guarded(&id, "on_trade", || strategy.on_trade(&mut ctx, &trade, ts));
                    }
                    StrategyMessage::OrderAck(ack) => {
                        let ts = ack.ts_arrival;
                        guarded(&id, "on_order_ack", || {
                            strategy.on_order_ack(&mut ctx, &ack, ts)
                        });
                    }
                    StrategyMessage::Control(ctrl) => {
                        let ts = ctrl.ts_arrival;
                        let is_shutdown = ctrl.kind == StrategyControlKind::Shutdown;
                        guarded(&id, "on_sim_control", || {
                            strategy.on_sim_control(&mut ctx, &ctrl, ts)
                        });
                        if is_shutdown {
                            // Keep consuming: acks for orders submitted from
                            // a still-running callback may land after this
                            // control. The dispatcher closes the mailbox once
                            // everything has been routed.
                            info!(strategy = %id, "shutdown control received, draining remaining events");
                            shutdown_ts = Some(ts);
                        }
                    }
                }
                // The Release pairs with the dispatcher's Acquire: once it
                // observes this count, any order submitted by the callback
                // above is already in the request queue.
                processed.fetch_add(1, Ordering::Release);
            }

            let final_ts = shutdown_ts.unwrap_or(last_ts);
            guarded(&id, "on_shutdown", || {
                strategy.on_shutdown(&mut ctx, final_ts)
            });
            info!(strategy = %id, "worker exited");
        })
        .with_context(|| format!("failed to spawn worker thread for strategy '{id_for_err}'"))
}
