use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use anyhow::Result;

use crate::core::parse_duration_ns;
use crate::latency::LatencyConfig;

/// Top-level simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub latency: LatencySettings,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Input data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the CSV tick file
    pub tick_file: PathBuf,
}

/// Latency timings as humanized duration strings ("50us", "10ms").
/// Parsed into a [`LatencyConfig`] by [`LatencySettings::build`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencySettings {
    #[serde(default = "default_market_data_feed")]
    pub market_data_feed: String,

    #[serde(default = "default_strategy_processing")]
    pub strategy_processing: String,

    #[serde(default = "default_order_network")]
    pub order_network_strat_to_exch: String,

    #[serde(default = "default_exchange_order_processing")]
    pub exchange_order_processing: String,

    #[serde(default = "default_exchange_fill_processing")]
    pub exchange_fill_processing: String,

    #[serde(default = "default_ack_network")]
    pub ack_network_exch_to_strat: String,
}

impl LatencySettings {
    /// Parse every duration string into nanoseconds
    pub fn build(&self) -> Result<LatencyConfig> {
        Ok(LatencyConfig {
            market_data_feed: parse_duration_ns(&self.market_data_feed)?,
            strategy_processing: parse_duration_ns(&self.strategy_processing)?,
            order_network_strat_to_exch: parse_duration_ns(&self.order_network_strat_to_exch)?,
            exchange_order_processing: parse_duration_ns(&self.exchange_order_processing)?,
            exchange_fill_processing: parse_duration_ns(&self.exchange_fill_processing)?,
            ack_network_exch_to_strat: parse_duration_ns(&self.ack_network_exch_to_strat)?,
        })
    }
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            market_data_feed: default_market_data_feed(),
            strategy_processing: default_strategy_processing(),
            order_network_strat_to_exch: default_order_network(),
            exchange_order_processing: default_exchange_order_processing(),
            exchange_fill_processing: default_exchange_fill_processing(),
            ack_network_exch_to_strat: default_ack_network(),
        }
    }
}

/// Engine tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bounded capacity of each strategy mailbox
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
        }
    }
}

/// Metrics output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_trades_path")]
    pub trades_path: PathBuf,

    #[serde(default = "default_latency_path")]
    pub latency_path: PathBuf,

    #[serde(default = "default_pnl_path")]
    pub pnl_path: PathBuf,

    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON-structured logs
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            trades_path: default_trades_path(),
            latency_path: default_latency_path(),
            pnl_path: default_pnl_path(),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_market_data_feed() -> String {
    "50us".to_string()
}

fn default_strategy_processing() -> String {
    "5us".to_string()
}

fn default_order_network() -> String {
    "20us".to_string()
}

fn default_exchange_order_processing() -> String {
    "10us".to_string()
}

fn default_exchange_fill_processing() -> String {
    "15us".to_string()
}

fn default_ack_network() -> String {
    "20us".to_string()
}

fn default_mailbox_capacity() -> usize {
    10_000
}

fn default_trades_path() -> PathBuf {
    PathBuf::from("sim_trades.csv")
}

fn default_latency_path() -> PathBuf {
    PathBuf::from("sim_latency.csv")
}

fn default_pnl_path() -> PathBuf {
    PathBuf::from("sim_pnl.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}
