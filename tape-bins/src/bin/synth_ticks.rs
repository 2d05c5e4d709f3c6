//! Synthetic tick-file generator
//!
//! Writes a random-walk quote/trade stream in the simulator's CSV format.
//! The walk is seeded, so a given seed always produces the same file.
//!
//! ```text
//! synth-ticks out.csv --symbol EURUSD --quotes 10000 --seed 42
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tape_bins::common::init_logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthetic tick data generator")]
struct Args {
    /// Output CSV path
    output: PathBuf,

    /// Symbol to generate
    #[arg(long, default_value = "EURUSD")]
    symbol: String,

    /// Number of quotes to generate
    #[arg(long, default_value = "10000")]
    quotes: u64,

    /// Starting mid price
    #[arg(long, default_value = "1.07100")]
    mid: f64,

    /// Quoted spread
    #[arg(long, default_value = "0.00005")]
    spread: f64,

    /// First exchange timestamp in epoch nanoseconds
    #[arg(long, default_value = "1000000000")]
    start_ts: i64,

    /// Nanoseconds between quotes
    #[arg(long, default_value = "1000000")]
    interval_ns: i64,

    /// Print a trade after every n-th quote (0 disables trades)
    #[arg(long, default_value = "5")]
    trade_every: u64,

    /// RNG seed; the same seed reproduces the same file
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, false)?;

    tracing::info!(
        "Generating {} quotes for {} into {}",
        args.quotes,
        args.symbol,
        args.output.display()
    );

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(
        out,
        "TYPE,TIMESTAMP_NS,SYMBOL,PRICE,SIZE,BID_PRICE,BID_SIZE,ASK_PRICE,ASK_SIZE"
    )?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut mid = args.mid;
    let half_spread = args.spread / 2.0;
    let mut ts = args.start_ts;

    for i in 0..args.quotes {
        // Zero-mean step of up to one spread per tick.
        mid += rng.gen_range(-1.0..1.0) * args.spread;
        if mid <= args.spread {
            mid = args.spread * 2.0;
        }

        let bid_sz: u64 = rng.gen_range(10_000..200_000);
        let ask_sz: u64 = rng.gen_range(10_000..200_000);
        writeln!(
            out,
            "QUOTE,{},{},,,{:.5},{},{:.5},{}",
            ts,
            args.symbol,
            mid - half_spread,
            bid_sz,
            mid + half_spread,
            ask_sz
        )?;
        ts += args.interval_ns;

        if args.trade_every > 0 && (i + 1) % args.trade_every == 0 {
            let aggressor_buy: bool = rng.gen();
            let px = if aggressor_buy {
                mid + half_spread
            } else {
                mid - half_spread
            };
            let size: u64 = rng.gen_range(1_000..50_000);
            writeln!(out, "TRADE,{},{},{:.5},{},,,,", ts, args.symbol, px, size)?;
            ts += args.interval_ns / 10;
        }
    }

    out.flush()?;
    tracing::info!("Done");
    Ok(())
}
