//! Latency model
//!
//! Pure functions from a boundary-crossing kind and a source timestamp to a
//! destination timestamp. Three boundaries exist: feed to strategy, strategy
//! to exchange, and exchange back to strategy (ack and fill take separate
//! exchange-internal processing times). The model is deterministic given its
//! configuration; stochastic distributions would be a new implementation
//! behind the same interface.

use crate::core::{DurationNs, Timestamp};

/// Nanosecond latencies for each boundary crossing.
///
/// All values are non-negative; arithmetic saturates rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyConfig {
    /// Exchange source to strategy mailbox (market data)
    pub market_data_feed: DurationNs,
    /// Time the strategy is assumed to spend deciding
    pub strategy_processing: DurationNs,
    /// Strategy output to exchange input
    pub order_network_strat_to_exch: DurationNs,
    /// Exchange internal handling before the acknowledgement leaves
    pub exchange_order_processing: DurationNs,
    /// Exchange internal handling before a fill report leaves
    pub exchange_fill_processing: DurationNs,
    /// Exchange output back to the strategy mailbox (acks and fills)
    pub ack_network_exch_to_strat: DurationNs,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            market_data_feed: 50_000,
            strategy_processing: 5_000,
            order_network_strat_to_exch: 20_000,
            exchange_order_processing: 10_000,
            exchange_fill_processing: 15_000,
            ack_network_exch_to_strat: 20_000,
        }
    }
}

/// Deterministic latency model over a [`LatencyConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LatencyModel {
    config: LatencyConfig,
}

impl LatencyModel {
    pub fn new(config: LatencyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LatencyConfig {
        &self.config
    }

    /// When market data stamped `ts_exchange` lands in a strategy mailbox
    pub fn md_arrival(&self, ts_exchange: Timestamp) -> Timestamp {
        ts_exchange.saturating_add_ns(self.config.market_data_feed)
    }

    /// When an order decided at `ts_decision` arrives at the exchange.
    /// Includes the strategy's own processing time.
    pub fn order_arrival_at_exchange(&self, ts_decision: Timestamp) -> Timestamp {
        ts_decision
            .saturating_add_ns(self.config.strategy_processing)
            .saturating_add_ns(self.config.order_network_strat_to_exch)
    }

    /// When the acknowledgement for an order that reached the exchange at
    /// `t_exch` lands back in the strategy mailbox
    pub fn ack_arrival_at_strategy(&self, t_exch: Timestamp) -> Timestamp {
        t_exch
            .saturating_add_ns(self.config.exchange_order_processing)
            .saturating_add_ns(self.config.ack_network_exch_to_strat)
    }

    /// When a fill report for an order that reached the exchange at `t_exch`
    /// lands back in the strategy mailbox
    pub fn fill_arrival_at_strategy(&self, t_exch: Timestamp) -> Timestamp {
        t_exch
            .saturating_add_ns(self.config.exchange_fill_processing)
            .saturating_add_ns(self.config.ack_network_exch_to_strat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LatencyModel {
        LatencyModel::new(LatencyConfig {
            market_data_feed: 100_000,
            strategy_processing: 10_000,
            order_network_strat_to_exch: 50_000,
            exchange_order_processing: 20_000,
            exchange_fill_processing: 30_000,
            ack_network_exch_to_strat: 50_000,
        })
    }

    #[test]
    fn test_md_arrival() {
        let m = model();
        let t0 = Timestamp::from_nanos(0);
        assert_eq!(m.md_arrival(t0), Timestamp::from_nanos(100_000));
    }

    #[test]
    fn test_order_arrival_at_exchange() {
        let m = model();
        let decision = Timestamp::from_nanos(0);
        assert_eq!(
            m.order_arrival_at_exchange(decision),
            Timestamp::from_nanos(60_000)
        );
    }

    #[test]
    fn test_ack_arrival_at_strategy() {
        let m = model();
        let t_exch = Timestamp::from_nanos(60_000);
        assert_eq!(
            m.ack_arrival_at_strategy(t_exch),
            Timestamp::from_nanos(60_000 + 20_000 + 50_000)
        );
    }

    #[test]
    fn test_fill_arrival_at_strategy() {
        let m = model();
        let t_exch = Timestamp::from_nanos(60_000);
        assert_eq!(
            m.fill_arrival_at_strategy(t_exch),
            Timestamp::from_nanos(60_000 + 30_000 + 50_000)
        );
    }

    #[test]
    fn test_outputs_shift_input_by_configured_constants() {
        // The functions are linear: output minus input equals the sum of the
        // configured components, independent of the input value.
        let m = model();
        for base in [0i64, 1_000_000_000, 1_700_000_000_000_000_000] {
            let t = Timestamp::from_nanos(base);
            assert_eq!(m.md_arrival(t).duration_since(t), 100_000);
            assert_eq!(m.order_arrival_at_exchange(t).duration_since(t), 60_000);
            assert_eq!(m.ack_arrival_at_strategy(t).duration_since(t), 70_000);
            assert_eq!(m.fill_arrival_at_strategy(t).duration_since(t), 80_000);
        }
    }

    #[test]
    fn test_monotone_in_input() {
        let m = model();
        let a = Timestamp::from_nanos(10);
        let b = Timestamp::from_nanos(20);
        assert!(m.md_arrival(a) < m.md_arrival(b));
        assert!(m.ack_arrival_at_strategy(a) < m.ack_arrival_at_strategy(b));
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let m = model();
        assert_eq!(m.md_arrival(Timestamp::MAX), Timestamp::MAX);
        assert_eq!(m.fill_arrival_at_strategy(Timestamp::MAX), Timestamp::MAX);
    }

    #[test]
    fn test_default_config_matches_shipping_values() {
        let cfg = LatencyConfig::default();
        assert_eq!(cfg.market_data_feed, 50_000);
        assert_eq!(cfg.strategy_processing, 5_000);
        assert_eq!(cfg.order_network_strat_to_exch, 20_000);
        assert_eq!(cfg.exchange_order_processing, 10_000);
        assert_eq!(cfg.exchange_fill_processing, 15_000);
        assert_eq!(cfg.ack_network_exch_to_strat, 20_000);
    }
}
