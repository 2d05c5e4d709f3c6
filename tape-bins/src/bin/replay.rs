//! Replay runner
//!
//! Loads a tick file, registers the selected strategies, runs the
//! simulation to completion and writes the metrics reports.
//!
//! ```text
//! replay data/eurusd_day1.csv --taker EURUSD:buy:1000 --mean-reversion EURUSD
//! replay --config sim.toml --taker EURUSD:buy:1000
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use tape_bins::common::{init_logging, print_stats};
use tape_core::config::SimConfig;
use tape_core::data::TickReader;
use tape_core::engine::Dispatcher;
use tape_core::latency::LatencyModel;
use tape_core::metrics::MetricsCollector;
use tape_core::Side;
use tape_strategies::{FirstQuoteTaker, MeanReversion, MeanReversionParams};

#[derive(Parser, Debug)]
#[command(author, version, about = "Deterministic market-replay simulator")]
struct Args {
    /// Path to the CSV tick file (overrides the config file)
    tick_file: Option<PathBuf>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Add a one-shot taker: SYMBOL:SIDE:QUANTITY (e.g. EURUSD:buy:1000)
    #[arg(long = "taker", value_name = "SPEC")]
    takers: Vec<String>,

    /// Add a mean-reversion strategy on SYMBOL
    #[arg(long = "mean-reversion", value_name = "SYMBOL")]
    mean_reversions: Vec<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,
}

fn parse_taker_spec(spec: &str) -> Result<(String, Side, u64)> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        bail!("taker spec '{spec}' must be SYMBOL:SIDE:QUANTITY");
    }
    let side = match parts[1].to_ascii_lowercase().as_str() {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        other => bail!("unknown side '{other}' in taker spec '{spec}'"),
    };
    let quantity: u64 = parts[2]
        .parse()
        .with_context(|| format!("invalid quantity in taker spec '{spec}'"))?;
    Ok((parts[0].to_string(), side, quantity))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let Some(tick_file) = args.tick_file.clone() else {
                bail!("either a tick file argument or --config is required");
            };
            SimConfig {
                data: tape_core::config::DataConfig { tick_file },
                latency: Default::default(),
                engine: Default::default(),
                metrics: Default::default(),
            }
        }
    };

    init_logging(&args.log_level, args.json_logs || config.metrics.json_logs)?;
    tracing::info!("=== Tape: market replay simulator ===");

    let tick_file = args
        .tick_file
        .clone()
        .unwrap_or_else(|| config.data.tick_file.clone());
    tracing::info!("Input data file: {}", tick_file.display());

    let latency_config = config.latency.build()?;
    tracing::info!(
        "Latency model: md_feed={}ns strat_proc={}ns order_net={}ns exch_ack={}ns exch_fill={}ns ack_net={}ns",
        latency_config.market_data_feed,
        latency_config.strategy_processing,
        latency_config.order_network_strat_to_exch,
        latency_config.exchange_order_processing,
        latency_config.exchange_fill_processing,
        latency_config.ack_network_exch_to_strat,
    );

    let collector = Arc::new(MetricsCollector::new(
        &config.metrics.trades_path,
        &config.metrics.latency_path,
        &config.metrics.pnl_path,
    ));

    let mut dispatcher = Dispatcher::new(
        LatencyModel::new(latency_config),
        Arc::clone(&collector) as Arc<dyn tape_core::metrics::MetricsSink>,
    )
    .with_mailbox_capacity(config.engine.mailbox_capacity);

    for (index, spec) in args.takers.iter().enumerate() {
        let (symbol, side, quantity) = parse_taker_spec(spec)?;
        dispatcher.add_strategy(
            format!("taker_{symbol}_{index}", index = index + 1),
            Box::new(FirstQuoteTaker::new(symbol.clone(), side, quantity)),
        )?;
    }
    for (index, symbol) in args.mean_reversions.iter().enumerate() {
        dispatcher.add_strategy(
            format!("meanrev_{symbol}_{index}", index = index + 1),
            Box::new(MeanReversion::new(
                symbol.clone(),
                MeanReversionParams::default(),
            )),
        )?;
    }

    let feed = TickReader::open(&tick_file)?;

    tracing::info!("Starting simulation run");
    let wall_start = Instant::now();
    let stats = dispatcher.run(feed)?;
    tracing::info!("Simulation finished in {} ms", wall_start.elapsed().as_millis());

    collector.report()?;
    print_stats(&stats);

    Ok(())
}
