//! Dispatch loop
//!
//! Owns the scheduler, the top-of-book store, the lifecycle simulator, the
//! order-request queue and the strategy registry, and drives the simulated
//! clock. The loop pops the earliest event, advances the clock to its
//! effective arrival time, and routes it: market data updates the book and
//! broadcasts a fresh copy to every mailbox; acks route to their owning
//! strategy; control events drive order-request draining and shutdown.
//!
//! The only wall-clock wait in the core is a short sleep taken while the
//! scheduler is momentarily empty but strategy responses may still be in
//! flight. Termination: once the feed is exhausted, the scheduler has
//! drained, and the workers are quiescent, a single end-of-feed marker is
//! scheduled one nanosecond after the current simulation time; dispatching
//! it sends every strategy a shutdown control, and the loop exits when
//! nothing further remains. Quiescence is tracked with per-strategy
//! delivered/processed counters so that a worker still inside a callback
//! (which may yet submit an order) holds both the end-of-feed marker and
//! the final exit, however long the callback takes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::core::{
    DispatcherControlEvent, DispatcherControlKind, DurationNs, Event, MarketEvent, OrderRequest,
    StrategyControlEvent, StrategyControlKind, StrategyId, StrategyMessage, Timestamp,
};
use crate::engine::event_queue::EventQueue;
use crate::engine::lifecycle::OrderLifecycle;
use crate::engine::worker::spawn_worker;
use crate::latency::LatencyModel;
use crate::metrics::MetricsSink;
use crate::orderbook::BookStore;
use crate::queue::{BlockingQueue, TryPop};
use crate::strategy::{Strategy, StrategyContext};

/// Default strategy mailbox capacity
pub const DEFAULT_MAILBOX_CAPACITY: usize = 10_000;

/// Interval between periodic order-request drains, in simulated time
const ORDER_REQUEST_POLL_NS: DurationNs = 10_000_000;

/// Wall-clock pause while waiting on in-flight strategy responses
const IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Run statistics returned by [`Dispatcher::run`]
#[derive(Debug, Clone, Copy)]
pub struct RunStats {
    pub market_events: u64,
    pub events_dispatched: u64,
    pub acks_routed: u64,
    pub orders_processed: u64,
    /// Simulation time when the loop exited
    pub final_sim_time: Timestamp,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            market_events: 0,
            events_dispatched: 0,
            acks_routed: 0,
            orders_processed: 0,
            final_sim_time: Timestamp::MIN,
        }
    }
}

struct StrategyRunner {
    id: StrategyId,
    mailbox: Arc<BlockingQueue<StrategyMessage>>,
    /// Taken when the worker spawns
    strategy: Option<Box<dyn Strategy>>,
    handle: Option<JoinHandle<()>>,
    /// Deliveries into the mailbox (the `on_init` slot counts as one).
    /// Only the dispatch thread writes this.
    delivered: u64,
    /// Callbacks the worker has fully completed; shared with the worker.
    /// `delivered == processed` means nothing is queued or in flight, so
    /// every order this strategy intended to submit has reached the
    /// request queue.
    processed: Arc<AtomicU64>,
}

/// The simulation driver
pub struct Dispatcher {
    latency: LatencyModel,
    metrics: Arc<dyn MetricsSink>,
    books: BookStore,
    event_queue: EventQueue,
    order_requests: Arc<BlockingQueue<OrderRequest>>,
    lifecycle: OrderLifecycle,
    runners: Vec<StrategyRunner>,
    runner_index: HashMap<StrategyId, usize>,
    mailbox_capacity: usize,
    current_sim_time: Timestamp,
    end_of_feed_scheduled: bool,
    running: bool,
    abort: Arc<AtomicBool>,
    stats: RunStats,
}

impl Dispatcher {
    pub fn new(latency: LatencyModel, metrics: Arc<dyn MetricsSink>) -> Self {
        info!("dispatcher initialized");
        Self {
            latency,
            metrics: Arc::clone(&metrics),
            books: BookStore::new(),
            event_queue: EventQueue::new(),
            order_requests: Arc::new(BlockingQueue::unbounded()),
            lifecycle: OrderLifecycle::new(latency, metrics),
            runners: Vec::new(),
            runner_index: HashMap::new(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            current_sim_time: Timestamp::MIN,
            end_of_feed_scheduled: false,
            running: false,
            abort: Arc::new(AtomicBool::new(false)),
            stats: RunStats::default(),
        }
    }

    /// Override the per-strategy mailbox capacity (before `run`)
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }

    /// Handle that strategies use to submit orders; exposed for tests that
    /// drive the lifecycle without a worker thread.
    pub fn order_request_queue(&self) -> Arc<BlockingQueue<OrderRequest>> {
        Arc::clone(&self.order_requests)
    }

    /// Flag that aborts the run loop early when set
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Read access to a symbol's book, if any quote has created it
    pub fn top_of_book(&self, symbol: &str) -> Option<&crate::orderbook::TopOfBook> {
        self.books.book(symbol)
    }

    /// Register a strategy. Permitted only before [`Self::run`]; ids must be
    /// unique.
    pub fn add_strategy(
        &mut self,
        id: impl Into<StrategyId>,
        strategy: Box<dyn Strategy>,
    ) -> Result<()> {
        let id = id.into();
        if self.running {
            bail!("cannot add strategy '{id}' while the simulation is running");
        }
        if self.runner_index.contains_key(&id) {
            bail!("strategy id '{id}' is already registered");
        }

        info!(strategy = %id, name = strategy.name(), "strategy registered");
        self.runner_index.insert(id.clone(), self.runners.len());
        self.runners.push(StrategyRunner {
            id,
            mailbox: Arc::new(BlockingQueue::bounded(self.mailbox_capacity)),
            strategy: Some(strategy),
            handle: None,
            delivered: 0,
            processed: Arc::new(AtomicU64::new(0)),
        });
        Ok(())
    }

    /// Run the simulation over a finite feed of market events in
    /// non-decreasing exchange-timestamp order. Blocks until complete.
    pub fn run(&mut self, feed: impl IntoIterator<Item = MarketEvent>) -> Result<RunStats> {
        self.running = true;
        if self.runners.is_empty() {
            warn!("no strategies registered, replaying without observers");
        }

        // Best effort: a second run in the same process keeps the handler
        // from the first and still aborts via the shared flag of that run.
        let abort = Arc::clone(&self.abort);
        if let Err(e) = ctrlc::set_handler(move || {
            warn!("interrupt received, aborting simulation");
            abort.store(true, Ordering::Release);
        }) {
            warn!("could not install interrupt handler: {e}");
        }

        self.load_feed(feed);

        // Prime the periodic order-request drain at the earliest scheduled
        // arrival so it interleaves with the first market data.
        let first_ts = self.event_queue.peek_ts().unwrap_or(Timestamp::MIN);
        self.event_queue
            .push(Event::DispatcherControl(DispatcherControlEvent {
                ts_arrival: first_ts,
                kind: DispatcherControlKind::ProcessOrderRequests,
            }));

        self.spawn_workers(first_ts)?;

        info!("entering main event loop");
        loop {
            if self.abort.load(Ordering::Acquire) {
                warn!("abort flag set, leaving event loop");
                break;
            }

            self.drain_order_requests();

            if self.event_queue.is_empty() {
                if !self.workers_quiescent() {
                    // A worker still holds undelivered events or is inside a
                    // callback that may yet submit. Yield and re-check.
                    thread::sleep(IDLE_SLEEP);
                    continue;
                }
                // Quiescent first, then the request queue: once every
                // completed callback is accounted for, any order it
                // submitted is already visible here.
                if !self.order_requests.is_empty() {
                    continue;
                }
                if self.end_of_feed_scheduled {
                    info!("scheduler drained after end of feed, ending simulation");
                    break;
                }
                self.schedule_end_of_feed();
                continue;
            }

            let Some(event) = self.event_queue.pop() else {
                continue;
            };
            self.current_sim_time = event.effective_ts();
            self.stats.events_dispatched += 1;
            self.dispatch(event);
        }

        self.stats.final_sim_time = self.current_sim_time;
        self.shutdown_workers();
        info!(
            events = self.stats.events_dispatched,
            orders = self.stats.orders_processed,
            final_sim_time = %self.stats.final_sim_time,
            "run complete"
        );
        Ok(self.stats)
    }

    /// Load every feed event into the scheduler with its strategy-arrival
    /// time computed by the latency model.
    fn load_feed(&mut self, feed: impl IntoIterator<Item = MarketEvent>) {
        let mut count = 0u64;
        for event in feed {
            let scheduled = match event {
                MarketEvent::Quote(mut q) => {
                    q.ts_arrival = self.latency.md_arrival(q.ts_exchange);
                    Event::Quote(q)
                }
                MarketEvent::Trade(mut t) => {
                    t.ts_arrival = self.latency.md_arrival(t.ts_exchange);
                    Event::Trade(t)
                }
            };
            self.event_queue.push(scheduled);
            count += 1;
        }
        self.stats.market_events = count;
        if count == 0 {
            warn!("no market data loaded, simulation will only run controls");
        } else {
            info!(events = count, "loaded market events into scheduler");
        }
    }

    fn spawn_workers(&mut self, initial_ts: Timestamp) -> Result<()> {
        for runner in &mut self.runners {
            let Some(strategy) = runner.strategy.take() else {
                continue;
            };
            let ctx = StrategyContext::new(
                runner.id.clone(),
                Arc::clone(&self.order_requests),
                Arc::clone(&self.metrics),
            );
            // The on_init callback occupies the first delivery slot; the
            // worker acknowledges it through the same counter, so a strategy
            // submitting from on_init holds off quiescence too.
            runner.delivered = 1;
            runner.handle = Some(spawn_worker(
                strategy,
                ctx,
                Arc::clone(&runner.mailbox),
                Arc::clone(&runner.processed),
                initial_ts,
            )?);
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::Quote(quote) => {
                self.books.apply_quote(&quote);
                for runner in &mut self.runners {
                    runner.mailbox.push(StrategyMessage::Quote(quote.clone()));
                    runner.delivered += 1;
                }
            }
            Event::Trade(trade) => {
                // Trades do not update the book in this model.
                for runner in &mut self.runners {
                    runner.mailbox.push(StrategyMessage::Trade(trade.clone()));
                    runner.delivered += 1;
                }
            }
            Event::OrderAck(ack) => match self.runner_index.get(&ack.strategy_id) {
                Some(&idx) => {
                    self.stats.acks_routed += 1;
                    let runner = &mut self.runners[idx];
                    runner.mailbox.push(StrategyMessage::OrderAck(ack));
                    runner.delivered += 1;
                }
                None => {
                    // Indicates a routing bug; never expected in a correct run.
                    warn!(
                        strategy = %ack.strategy_id,
                        client_order_id = ack.client_order_id,
                        "no strategy registered for ack, discarding"
                    );
                }
            },
            Event::DispatcherControl(ctrl) => match ctrl.kind {
                DispatcherControlKind::ProcessOrderRequests => {
                    self.drain_order_requests();
                    // Re-arm only while other events remain; the idle branch
                    // of the loop keeps draining once the scheduler empties.
                    if !self.event_queue.is_empty() {
                        self.event_queue
                            .push(Event::DispatcherControl(DispatcherControlEvent {
                                ts_arrival: self
                                    .current_sim_time
                                    .saturating_add_ns(ORDER_REQUEST_POLL_NS),
                                kind: DispatcherControlKind::ProcessOrderRequests,
                            }));
                    }
                }
            },
            Event::StrategyControl(ctrl) => {
                if ctrl.kind == StrategyControlKind::EndOfDataFeed {
                    info!(sim_time = %self.current_sim_time, "end of feed dispatched, signalling strategies");
                    for runner in &mut self.runners {
                        runner
                            .mailbox
                            .push(StrategyMessage::Control(StrategyControlEvent {
                                ts_arrival: self.current_sim_time,
                                kind: StrategyControlKind::Shutdown,
                                target_strategy_id: Some(runner.id.clone()),
                            }));
                        runner.delivered += 1;
                    }
                }
            }
        }
    }

    fn drain_order_requests(&mut self) {
        while let TryPop::Item(request) = self.order_requests.try_pop() {
            debug!(
                strategy = %request.strategy_id,
                client_order_id = request.client_order_id,
                "processing order request"
            );
            self.stats.orders_processed += 1;
            let book = self.books.book_mut(&request.symbol);
            for event in self.lifecycle.process(request, book) {
                self.event_queue.push(event);
            }
        }
    }

    /// Whether every strategy has fully handled everything delivered to it.
    /// Counter equality (not mailbox emptiness) is the test: a worker midway
    /// through a callback has `processed < delivered` even though its
    /// mailbox is empty, and may still be about to submit an order. Gates
    /// both the end-of-feed marker and the final loop exit.
    fn workers_quiescent(&self) -> bool {
        self.runners
            .iter()
            .all(|r| r.processed.load(Ordering::Acquire) == r.delivered)
    }

    fn schedule_end_of_feed(&mut self) {
        info!(sim_time = %self.current_sim_time, "feed exhausted, scheduling end-of-feed marker");
        self.event_queue
            .push(Event::StrategyControl(StrategyControlEvent {
                ts_arrival: self.current_sim_time.saturating_add_ns(1),
                kind: StrategyControlKind::EndOfDataFeed,
                target_strategy_id: None,
            }));
        self.end_of_feed_scheduled = true;
    }

    fn shutdown_workers(&mut self) {
        info!("closing queues and joining workers");
        self.order_requests.close();
        for runner in &mut self.runners {
            runner.mailbox.close();
            if let Some(handle) = runner.handle.take() {
                if handle.join().is_err() {
                    // Worker bodies absorb callback panics, so this is
                    // unexpected infrastructure failure.
                    warn!(strategy = %runner.id, "worker thread terminated abnormally");
                }
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        // A dropped dispatcher that never ran (or aborted mid-run) must not
        // leak blocked workers.
        self.order_requests.close();
        for runner in &mut self.runners {
            runner.mailbox.close();
            if let Some(handle) = runner.handle.take() {
                let _ = handle.join();
            }
        }
    }
}
