//! Tick-file parser
//!
//! Reads the CSV tick format and yields market events in file order. The
//! expected layout, with a header row:
//!
//! ```text
//! TYPE,TIMESTAMP_NS,SYMBOL,PRICE,SIZE,BID_PRICE,BID_SIZE,ASK_PRICE,ASK_SIZE
//! QUOTE,1000000000,EURUSD,,,1.07100,100000,1.07105,100000
//! TRADE,1000000500,EURUSD,1.07102,25000,,,,
//! ```
//!
//! `QUOTE` rows use the four bid/ask fields; `TRADE` rows use `PRICE` and
//! `SIZE`. Timestamps are epoch nanoseconds, sorted ascending. Malformed
//! rows are logged and skipped; the core never sees them.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::core::{MarketEvent, QuoteEvent, Timestamp, TradeEvent};

/// Streaming reader over a tick file
pub struct TickReader {
    lines: Lines<BufReader<File>>,
    line_number: u64,
}

impl TickReader {
    /// Open a tick file and skip its header row. A missing file is a
    /// configuration error surfaced before the simulation starts.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open tick file {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();

        match lines.next() {
            Some(header) => {
                let header = header.context("failed to read tick file header")?;
                info!(path = %path.display(), header = %header, "opened tick file");
            }
            None => warn!(path = %path.display(), "tick file is empty"),
        }

        Ok(Self {
            lines,
            line_number: 1,
        })
    }

    fn parse_line(&self, line: &str) -> Option<MarketEvent> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.is_empty() || line.trim().is_empty() {
            return None;
        }

        let parse = || -> Result<MarketEvent> {
            let kind = fields[0].trim();
            let ts_exchange = Timestamp::from_nanos(
                fields
                    .get(1)
                    .context("missing timestamp")?
                    .trim()
                    .parse()
                    .context("invalid timestamp")?,
            );
            let symbol = fields.get(2).context("missing symbol")?.trim().to_string();

            match kind {
                "QUOTE" if fields.len() >= 9 => Ok(MarketEvent::Quote(QuoteEvent {
                    ts_exchange,
                    // Placeholder until the dispatcher applies feed latency.
                    ts_arrival: ts_exchange,
                    symbol,
                    bid_px: fields[5].trim().parse().context("invalid bid price")?,
                    bid_sz: fields[6].trim().parse().context("invalid bid size")?,
                    ask_px: fields[7].trim().parse().context("invalid ask price")?,
                    ask_sz: fields[8].trim().parse().context("invalid ask size")?,
                })),
                "TRADE" if fields.len() >= 5 => Ok(MarketEvent::Trade(TradeEvent {
                    ts_exchange,
                    ts_arrival: ts_exchange,
                    symbol,
                    price: fields[3].trim().parse().context("invalid trade price")?,
                    size: fields[4].trim().parse().context("invalid trade size")?,
                })),
                other => anyhow::bail!("unknown or short record type '{other}'"),
            }
        };

        match parse() {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(
                    line = self.line_number,
                    error = %e,
                    "skipping malformed tick record"
                );
                None
            }
        }
    }
}

impl Iterator for TickReader {
    type Item = MarketEvent;

    fn next(&mut self) -> Option<MarketEvent> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = self.line_number + 1, error = %e, "read error, stopping");
                    return None;
                }
            };
            self.line_number += 1;
            if let Some(event) = self.parse_line(&line) {
                return Some(event);
            }
        }
    }
}
