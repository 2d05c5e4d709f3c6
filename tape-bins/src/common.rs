//! Common utilities for all binaries
//!
//! Shared logging initialization and final-report helpers.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tape_core::engine::RunStats;

/// Initialize tracing/logging
pub fn init_logging(level: &str, json_logs: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    if json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(filter)
            .init();
    }

    Ok(())
}

/// Print final statistics
pub fn print_stats(stats: &RunStats) {
    tracing::info!("=== Final Statistics ===");
    tracing::info!("Market events loaded: {}", stats.market_events);
    tracing::info!("Events dispatched: {}", stats.events_dispatched);
    tracing::info!("Order requests processed: {}", stats.orders_processed);
    tracing::info!("Acks routed: {}", stats.acks_routed);
    tracing::info!("Final simulation time: {}", stats.final_sim_time);
}
