//! Primitive types for the simulation core
//!
//! All time-bearing values are epoch nanoseconds. There is exactly one
//! simulated clock: the effective arrival time of the most recently popped
//! scheduler event.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute epsilon for price comparisons
pub const PRICE_EPSILON: f64 = 1e-9;

/// Price in quote currency. NaN is the sentinel for "no price":
/// market orders carry it, and unfilled matches return it.
pub type Price = f64;

/// Sentinel price for market orders and "no fill"
pub const INVALID_PRICE: Price = f64::NAN;

/// Whether a price carries an actual value (i.e. is not the sentinel)
#[inline]
pub fn is_valid_price(px: Price) -> bool {
    !px.is_nan()
}

/// Order/fill quantity
pub type Quantity = u64;

/// Client- or exchange-assigned order identifier
pub type OrderId = u64;

/// Opaque strategy identifier, unique per registered strategy
pub type StrategyId = String;

/// Signed nanosecond duration
pub type DurationNs = i64;

/// Epoch-nanosecond timestamp
///
/// Orderable, subtractable into a signed [`DurationNs`], and saturating on
/// arithmetic so latency sums near the representable extremes cannot wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Sentinel for "before any event" (used before the first pop)
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    /// Latest representable instant
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    #[inline]
    pub const fn from_nanos(ns: i64) -> Self {
        Self(ns)
    }

    #[inline]
    pub const fn nanos(self) -> i64 {
        self.0
    }

    /// Shift by a duration, saturating at the representable extremes
    #[inline]
    pub const fn saturating_add_ns(self, ns: DurationNs) -> Self {
        Self(self.0.saturating_add(ns))
    }

    /// Signed nanoseconds from `earlier` to `self`
    #[inline]
    pub const fn duration_since(self, earlier: Timestamp) -> DurationNs {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a humanized duration string ("100ns", "50us", "10ms", "2s") into
/// nanoseconds. A bare "0" is accepted as zero. Negative durations are
/// rejected; the latency model has no use for them.
pub fn parse_duration_ns(s: &str) -> Result<DurationNs> {
    let trimmed = s.trim().to_ascii_lowercase();
    if trimmed.is_empty() {
        bail!("empty duration string");
    }

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '-')
        .unwrap_or(trimmed.len());
    let (value_str, unit) = trimmed.split_at(split);

    let value: i64 = value_str
        .parse()
        .with_context(|| format!("invalid duration value in '{s}'"))?;
    if value < 0 {
        bail!("negative duration '{s}'");
    }

    let scale = match unit {
        "ns" => 1,
        "us" | "micros" => 1_000,
        "ms" | "millis" => 1_000_000,
        "s" | "sec" => 1_000_000_000,
        "" if value == 0 => 1,
        _ => bail!("unsupported duration unit in '{s}'"),
    };

    value
        .checked_mul(scale)
        .with_context(|| format!("duration '{s}' overflows nanoseconds"))
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Execute immediately against the opposite top of book
    Market,
    /// Aggressive if the limit crosses the opposite top, otherwise passive
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

/// Order lifecycle state
///
/// The core emits at most an `Acknowledged` plus one optional terminal
/// `Filled`/`PartiallyFilled` per request. The remaining states exist for
/// strategies and future extensions (cancels, time-in-force).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Submitted by the strategy, not yet processed by the simulator
    PendingNew,
    /// Accepted by the simulated exchange
    Acknowledged,
    PartiallyFilled,
    Filled,
    Rejected,
    Cancelled,
    Expired,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::PendingNew => "PENDING_NEW",
            OrderStatus::Acknowledged => "ACKNOWLEDGED",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Expired => "EXPIRED",
        };
        write!(f, "{s}")
    }
}
