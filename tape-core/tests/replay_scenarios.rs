//! End-to-end replay scenarios
//!
//! Each test drives a full dispatcher run over a literal feed and checks the
//! exact trace a strategy observes: arrival timestamps, ack contents and
//! ordering, and the book state left behind.

mod common;

use std::sync::Arc;

use common::{acks, journal, quote, quotes, Observed, PlannedOrder, Probe};
use tape_core::core::StrategyControlKind;
use tape_core::metrics::{MetricsCollector, NullSink};
use tape_core::prelude::*;

fn dispatcher() -> Dispatcher {
    Dispatcher::new(LatencyModel::new(LatencyConfig::default()), Arc::new(NullSink))
}

#[test]
fn empty_feed_runs_init_shutdown_only() {
    let log = journal();
    let mut dispatcher = dispatcher();
    dispatcher
        .add_strategy("probe_1", Box::new(Probe::passive(Arc::clone(&log))))
        .unwrap();

    let stats = dispatcher.run(Vec::new()).unwrap();

    let observed = log.lock().clone();
    assert_eq!(
        observed,
        vec![
            Observed::Init(Timestamp::MIN),
            Observed::Control {
                kind: StrategyControlKind::Shutdown,
                ts: Timestamp::MIN.saturating_add_ns(1),
            },
            Observed::Shutdown(Timestamp::MIN.saturating_add_ns(1)),
        ]
    );
    assert_eq!(stats.market_events, 0);
    assert_eq!(stats.orders_processed, 0);
    assert_eq!(stats.acks_routed, 0);
}

#[test]
fn single_quote_arrives_with_feed_latency_and_updates_book() {
    let log = journal();
    let mut dispatcher = dispatcher();
    dispatcher
        .add_strategy("probe_1", Box::new(Probe::passive(Arc::clone(&log))))
        .unwrap();

    let feed = vec![quote(1_000_000_000, "EURUSD", 1.07100, 100_000, 1.07105, 100_000)];
    let stats = dispatcher.run(feed).unwrap();

    let seen = quotes(&log);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "EURUSD");
    assert_eq!(seen[0].1, Timestamp::from_nanos(1_000_050_000));

    let book = dispatcher.top_of_book("EURUSD").unwrap();
    let bid = book.bid().unwrap();
    let ask = book.ask().unwrap();
    assert_eq!(bid.px, 1.07100);
    assert_eq!(bid.sz, 100_000);
    assert_eq!(ask.px, 1.07105);
    assert_eq!(ask.sz, 100_000);

    assert_eq!(stats.market_events, 1);
    assert!(acks(&log).is_empty());
}

#[test]
fn market_buy_is_acked_then_filled_at_modelled_latencies() {
    let log = journal();
    let mut dispatcher = dispatcher();
    dispatcher
        .add_strategy(
            "probe_1",
            Box::new(Probe::with_plan(
                Arc::clone(&log),
                vec![PlannedOrder::market("EURUSD", Side::Buy, 1_000)],
            )),
        )
        .unwrap();

    let feed = vec![quote(1_000_000_000, "EURUSD", 1.07100, 100_000, 1.07105, 100_000)];
    let stats = dispatcher.run(feed).unwrap();

    let acks = acks(&log);
    assert_eq!(acks.len(), 2);

    // Quote arrives at 1_000_050_000; decision + 5us strategy processing
    // + 20us order network + 10us exchange ack + 20us ack network.
    let first = &acks[0];
    assert_eq!(first.client_order_id, 1);
    assert_eq!(first.status, OrderStatus::Acknowledged);
    assert_eq!(first.ts_arrival, Timestamp::from_nanos(1_000_105_000));
    assert_eq!(first.cum_qty, 0);
    assert_eq!(first.leaves_qty, 1_000);

    // Fill path swaps the 10us exchange ack stage for 15us fill processing.
    let fill = &acks[1];
    assert_eq!(fill.client_order_id, 1);
    assert_eq!(fill.status, OrderStatus::Filled);
    assert_eq!(fill.ts_arrival, Timestamp::from_nanos(1_000_110_000));
    assert_eq!(fill.last_fill_px, 1.07105);
    assert_eq!(fill.last_fill_qty, 1_000);
    assert_eq!(fill.cum_qty, 1_000);
    assert_eq!(fill.leaves_qty, 0);

    assert_eq!(stats.orders_processed, 1);
    assert_eq!(stats.acks_routed, 2);

    // The match consumed 1000 from the resting ask.
    let ask = dispatcher.top_of_book("EURUSD").unwrap().ask().unwrap();
    assert_eq!(ask.sz, 99_000);
}

#[test]
fn market_buy_with_insufficient_depth_partially_fills() {
    let log = journal();
    let mut dispatcher = dispatcher();
    dispatcher
        .add_strategy(
            "probe_1",
            Box::new(Probe::with_plan(
                Arc::clone(&log),
                vec![PlannedOrder::market("EURUSD", Side::Buy, 1_000)],
            )),
        )
        .unwrap();

    let feed = vec![quote(1_000_000_000, "EURUSD", 1.07100, 100_000, 1.07105, 500)];
    dispatcher.run(feed).unwrap();

    let acks = acks(&log);
    assert_eq!(acks.len(), 2);
    let fill = &acks[1];
    assert_eq!(fill.status, OrderStatus::PartiallyFilled);
    assert_eq!(fill.last_fill_qty, 500);
    assert_eq!(fill.leaves_qty, 500);
    assert_eq!(fill.cum_qty + fill.leaves_qty, 1_000);

    // The ask level was fully consumed and cleared.
    let book = dispatcher.top_of_book("EURUSD").unwrap();
    assert!(book.ask().is_none());
    assert!(book.bid().is_some());
}

#[test]
fn passive_limit_is_acknowledged_without_fill() {
    let log = journal();
    let mut dispatcher = dispatcher();
    dispatcher
        .add_strategy(
            "probe_1",
            Box::new(Probe::with_plan(
                Arc::clone(&log),
                vec![PlannedOrder::limit("EURUSD", Side::Buy, 1.07090, 1_000)],
            )),
        )
        .unwrap();

    let feed = vec![quote(1_000_000_000, "EURUSD", 1.07100, 100_000, 1.07105, 100_000)];
    dispatcher.run(feed).unwrap();

    let acks = acks(&log);
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].status, OrderStatus::Acknowledged);
    assert_eq!(acks[0].leaves_qty, 1_000);

    // Passive limits are not retained; the book is exactly the quote.
    let book = dispatcher.top_of_book("EURUSD").unwrap();
    assert_eq!(book.bid().unwrap().sz, 100_000);
    assert_eq!(book.ask().unwrap().sz, 100_000);
}

#[test]
fn two_strategies_each_see_the_quote_once_before_shutdown() {
    let log_a = journal();
    let log_b = journal();
    let mut dispatcher = dispatcher();
    dispatcher
        .add_strategy("probe_a", Box::new(Probe::passive(Arc::clone(&log_a))))
        .unwrap();
    dispatcher
        .add_strategy("probe_b", Box::new(Probe::passive(Arc::clone(&log_b))))
        .unwrap();

    let feed = vec![quote(1_000_000_000, "EURUSD", 1.07100, 100_000, 1.07105, 100_000)];
    dispatcher.run(feed).unwrap();

    for log in [&log_a, &log_b] {
        let seen = quotes(log);
        assert_eq!(seen.len(), 1, "each strategy sees the quote exactly once");
        assert_eq!(seen[0].1, Timestamp::from_nanos(1_000_050_000));

        // The quote precedes the shutdown in the strategy's local order.
        let observed = log.lock().clone();
        let quote_idx = observed
            .iter()
            .position(|o| matches!(o, Observed::Quote { .. }))
            .unwrap();
        let shutdown_idx = observed
            .iter()
            .position(|o| matches!(o, Observed::Shutdown(_)))
            .unwrap();
        assert!(quote_idx < shutdown_idx);
    }
}

#[test]
fn fills_reach_the_metrics_sink() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Arc::new(MetricsCollector::new(
        dir.path().join("trades.csv"),
        dir.path().join("latency.csv"),
        dir.path().join("pnl.csv"),
    ));

    let log = journal();
    let mut dispatcher = Dispatcher::new(
        LatencyModel::new(LatencyConfig::default()),
        Arc::clone(&collector) as Arc<dyn MetricsSink>,
    );
    dispatcher
        .add_strategy(
            "probe_1",
            Box::new(Probe::with_plan(
                Arc::clone(&log),
                vec![PlannedOrder::market("EURUSD", Side::Buy, 1_000)],
            )),
        )
        .unwrap();

    let feed = vec![quote(1_000_000_000, "EURUSD", 1.07100, 100_000, 1.07105, 100_000)];
    dispatcher.run(feed).unwrap();

    assert_eq!(collector.trade_count(), 1);
    let pnl = collector.pnl("probe_1", "EURUSD").unwrap();
    assert_eq!(pnl.position, 1_000);

    collector.report().unwrap();
    let trades = std::fs::read_to_string(dir.path().join("trades.csv")).unwrap();
    assert!(trades.contains("probe_1,EURUSD,BUY,1.07105,1000"));
}
