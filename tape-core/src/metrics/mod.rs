//! Metrics sinks
//!
//! The core emits fire-and-forget hooks: one trade record per synthesised
//! fill and latency samples at points of interest (decision-to-fill-ack,
//! order-submitted markers). Sinks own their thread safety; the provided
//! [`MetricsCollector`] accumulates in memory behind a mutex and writes
//! trades, latency and PnL summary CSVs on [`MetricsCollector::report`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::{DurationNs, OrderId, Price, Quantity, Side, StrategyId, Timestamp};

/// One synthesised execution, recorded at fill-ack time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedTrade {
    /// Arrival time of the fill ack at the strategy
    pub ts: Timestamp,
    pub strategy_id: StrategyId,
    pub symbol: String,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub client_order_id: OrderId,
    pub exchange_order_id: OrderId,
}

/// One latency sample
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyRecord {
    pub ts: Timestamp,
    pub source: String,
    pub latency: DurationNs,
}

/// The capability the core emits to. Implementations must be internally
/// thread safe: strategy workers and the dispatch thread both record.
pub trait MetricsSink: Send + Sync {
    fn record_trade(&self, trade: &SimulatedTrade);
    fn record_latency(&self, source: &str, latency: DurationNs, ts: Timestamp);
}

/// Sink that drops everything
#[derive(Debug, Default)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn record_trade(&self, _trade: &SimulatedTrade) {}
    fn record_latency(&self, _source: &str, _latency: DurationNs, _ts: Timestamp) {}
}

/// Per-(strategy, symbol) running position and PnL.
///
/// Realization uses average cost: closing quantity realizes against the
/// average entry price of the open position, and a fill through flat opens
/// the remainder at the fill price.
#[derive(Debug, Clone, Copy, Default)]
pub struct PnlEntry {
    /// Signed position: positive long, negative short
    pub position: i64,
    /// Average entry price of the open position (meaningless when flat)
    pub avg_entry_px: f64,
    pub realized_pnl: f64,
    pub total_volume_traded: f64,
}

impl PnlEntry {
    fn apply(&mut self, side: Side, price: Price, quantity: Quantity) {
        let qty = quantity as i64;
        let signed = match side {
            Side::Buy => qty,
            Side::Sell => -qty,
        };
        self.total_volume_traded += price * quantity as f64;

        if self.position == 0 || self.position.signum() == signed.signum() {
            // Extending (or opening): fold the fill into the average entry.
            let old_abs = self.position.unsigned_abs() as f64;
            let new_abs = old_abs + qty as f64;
            self.avg_entry_px = (self.avg_entry_px * old_abs + price * qty as f64) / new_abs;
            self.position += signed;
            return;
        }

        // Reducing: realize against the average entry.
        let closing = qty.min(self.position.abs());
        let per_unit = if self.position > 0 {
            price - self.avg_entry_px
        } else {
            self.avg_entry_px - price
        };
        self.realized_pnl += per_unit * closing as f64;
        self.position += signed;

        if self.position.signum() == signed.signum() {
            // Flipped through flat: the remainder opens at the fill price.
            self.avg_entry_px = price;
        } else if self.position == 0 {
            self.avg_entry_px = 0.0;
        }
    }
}

#[derive(Default)]
struct CollectorState {
    trades: Vec<SimulatedTrade>,
    latencies: Vec<LatencyRecord>,
    pnl: HashMap<(StrategyId, String), PnlEntry>,
}

/// In-memory collector with CSV reporting
pub struct MetricsCollector {
    trades_path: PathBuf,
    latency_path: PathBuf,
    pnl_path: PathBuf,
    state: Mutex<CollectorState>,
}

impl MetricsCollector {
    pub fn new(
        trades_path: impl Into<PathBuf>,
        latency_path: impl Into<PathBuf>,
        pnl_path: impl Into<PathBuf>,
    ) -> Self {
        let collector = Self {
            trades_path: trades_path.into(),
            latency_path: latency_path.into(),
            pnl_path: pnl_path.into(),
            state: Mutex::new(CollectorState::default()),
        };
        info!(
            trades = %collector.trades_path.display(),
            latency = %collector.latency_path.display(),
            pnl = %collector.pnl_path.display(),
            "metrics collector initialized"
        );
        collector
    }

    pub fn trade_count(&self) -> usize {
        self.state.lock().trades.len()
    }

    pub fn latency_sample_count(&self) -> usize {
        self.state.lock().latencies.len()
    }

    /// Snapshot of the PnL entry for one (strategy, symbol) pair
    pub fn pnl(&self, strategy_id: &str, symbol: &str) -> Option<PnlEntry> {
        self.state
            .lock()
            .pnl
            .get(&(strategy_id.to_string(), symbol.to_string()))
            .copied()
    }

    /// Write all three CSV artifacts
    pub fn report(&self) -> Result<()> {
        let state = self.state.lock();
        info!(
            trades = state.trades.len(),
            latency_samples = state.latencies.len(),
            "writing metrics reports"
        );

        let mut trades = open_report(&self.trades_path)?;
        writeln!(
            trades,
            "TimestampNS,StrategyID,Symbol,Side,Price,Quantity,ClientOrderID,ExchangeOrderID"
        )?;
        for t in &state.trades {
            writeln!(
                trades,
                "{},{},{},{},{:.5},{},{},{}",
                t.ts,
                t.strategy_id,
                t.symbol,
                t.side,
                t.price,
                t.quantity,
                t.client_order_id,
                t.exchange_order_id
            )?;
        }
        trades.flush()?;

        let mut latency = open_report(&self.latency_path)?;
        writeln!(latency, "EventTimestampNS,Source,LatencyNS")?;
        for rec in &state.latencies {
            writeln!(latency, "{},{},{}", rec.ts, rec.source, rec.latency)?;
        }
        latency.flush()?;

        let mut pnl = open_report(&self.pnl_path)?;
        writeln!(
            pnl,
            "StrategyID,Symbol,FinalPosition,TotalVolumeTraded,RealizedPnL"
        )?;
        let mut entries: Vec<_> = state.pnl.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for ((strategy_id, symbol), entry) in entries {
            writeln!(
                pnl,
                "{},{},{},{:.2},{:.2}",
                strategy_id, symbol, entry.position, entry.total_volume_traded, entry.realized_pnl
            )?;
        }
        pnl.flush()?;

        Ok(())
    }
}

fn open_report(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("failed to open report file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

impl MetricsSink for MetricsCollector {
    fn record_trade(&self, trade: &SimulatedTrade) {
        let mut state = self.state.lock();
        state
            .pnl
            .entry((trade.strategy_id.clone(), trade.symbol.clone()))
            .or_default()
            .apply(trade.side, trade.price, trade.quantity);
        debug!(
            strategy = %trade.strategy_id,
            symbol = %trade.symbol,
            side = %trade.side,
            qty = trade.quantity,
            price = trade.price,
            "trade recorded"
        );
        state.trades.push(trade.clone());
    }

    fn record_latency(&self, source: &str, latency: DurationNs, ts: Timestamp) {
        self.state.lock().latencies.push(LatencyRecord {
            ts,
            source: source.to_string(),
            latency,
        });
    }
}
