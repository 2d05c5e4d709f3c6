pub mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::{Config as ConfigLoader, Environment, File};
use std::path::Path;

impl SimConfig {
    /// Load configuration from a TOML file with `TAPE__` environment
    /// variable overrides layered on top of the built-in defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();

        let loader = ConfigLoader::builder()
            .set_default("latency.market_data_feed", "50us")?
            .set_default("latency.strategy_processing", "5us")?
            .set_default("latency.order_network_strat_to_exch", "20us")?
            .set_default("latency.exchange_order_processing", "10us")?
            .set_default("latency.exchange_fill_processing", "15us")?
            .set_default("latency.ack_network_exch_to_strat", "20us")?
            .set_default("engine.mailbox_capacity", 10_000)?
            .set_default("metrics.trades_path", "sim_trades.csv")?
            .set_default("metrics.latency_path", "sim_latency.csv")?
            .set_default("metrics.pnl_path", "sim_pnl.csv")?
            .set_default("metrics.log_level", "info")?
            .set_default("metrics.json_logs", false)?
            .add_source(File::from(config_path))
            .add_source(Environment::with_prefix("TAPE").separator("__"))
            .build()
            .context("failed to build configuration")?;

        let cfg: SimConfig = loader
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate field values beyond what deserialization enforces
    pub fn validate(&self) -> Result<()> {
        if self.data.tick_file.as_os_str().is_empty() {
            anyhow::bail!("data.tick_file must be set");
        }

        // Surfaces malformed duration strings at startup, before run().
        self.latency
            .build()
            .context("invalid latency configuration")?;

        if self.engine.mailbox_capacity == 0 {
            anyhow::bail!("engine.mailbox_capacity must be positive");
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.metrics.log_level.as_str()) {
            anyhow::bail!(
                "invalid log level '{}', must be one of: {:?}",
                self.metrics.log_level,
                valid_log_levels
            );
        }

        Ok(())
    }
}
